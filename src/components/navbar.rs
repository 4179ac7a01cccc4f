use leptos::prelude::*;

use crate::state::{Store, ToastKind};

/// Top navigation bar with the page title, a collapsible action menu, and
/// the refresh / settings controls. The collapse state lives on the DOM as
/// the `show` class so the mobile adapter can fold the menu from outside.
#[component]
pub fn Navbar() -> impl IntoView {
    let store = Store::use_store();
    let collapse_ref = NodeRef::<leptos::html::Div>::new();

    let toggle_menu = move |_| {
        if let Some(collapse) = collapse_ref.get() {
            let classes = collapse.class_list();
            if classes.contains("show") {
                let _ = classes.remove_1("show");
            } else {
                let _ = classes.add_1("show");
            }
        }
    };

    view! {
        <header class="navbar">
            <button
                class="navbar-toggler"
                title="Toggle menu"
                on:click=toggle_menu
            >
                "\u{2630}"
            </button>
            <span id="page-title" class="navbar-title">
                {move || store.view.get().title()}
            </span>
            <div class="navbar-collapse" node_ref=collapse_ref>
                <ul class="navbar-nav">
                    <li class="nav-item">
                        <a
                            href="#"
                            class="nav-link"
                            on:click=move |ev| {
                                ev.prevent_default();
                                store.refresh_current_section();
                            }
                        >
                            "Refresh"
                        </a>
                    </li>
                    <li class="nav-item">
                        <a
                            href="#"
                            class="nav-link"
                            on:click=move |ev| {
                                ev.prevent_default();
                                store.toast("Settings are not yet implemented", ToastKind::Info);
                            }
                        >
                            "Settings"
                        </a>
                    </li>
                </ul>
            </div>
        </header>
    }
}

use leptos::prelude::*;

use crate::state::{Section, Store};

/// Section navigation. Each link drives the view switcher by section name;
/// the active entry is highlighted, or none when no known section is
/// selected.
#[component]
pub fn Sidebar() -> impl IntoView {
    let store = Store::use_store();

    view! {
        <nav class="sidebar">
            <div class="sidebar-header">
                <h1 class="sidebar-title">"FactorDesk"</h1>
                <p class="sidebar-subtitle">"Multi-Factor Stock Selection"</p>
            </div>
            <ul class="nav-list">
                {Section::ALL
                    .into_iter()
                    .map(|section| {
                        let is_active = move || store.view.get().active == Some(section);
                        view! {
                            <li class="nav-item">
                                <a
                                    href="#"
                                    class="nav-link"
                                    class:active=is_active
                                    on:click=move |ev| {
                                        ev.prevent_default();
                                        store.switch_section(section.name());
                                    }
                                >
                                    {section.title()}
                                </a>
                            </li>
                        }
                    })
                    .collect::<Vec<_>>()}
            </ul>
        </nav>
    }
}

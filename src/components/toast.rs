use leptos::prelude::*;

use crate::state::Store;

/// Fixed-position stack of dismissible notices. Each toast also removes
/// itself after three seconds (scheduled when it is pushed to the store).
#[component]
pub fn ToastHost() -> impl IntoView {
    let store = Store::use_store();

    view! {
        <div
            class="toast-stack"
            style="position: fixed; top: 20px; right: 20px; z-index: 9999;"
        >
            <For
                each=move || store.toasts.get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <div
                            class=format!("{} alert-dismissible", toast.kind.css_class())
                            style="min-width: 300px; display: flex; align-items: center; gap: 8px;"
                        >
                            <span>{toast.message.clone()}</span>
                            <button
                                class="btn-close"
                                title="Dismiss"
                                on:click=move |_| store.dismiss_toast(id)
                            >
                                "\u{2715}"
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}

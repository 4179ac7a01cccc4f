use leptos::prelude::*;

use crate::state::{Store, ToastKind};

/// Placeholder section: backtesting runs entirely server-side and has no
/// console surface yet.
#[component]
pub fn BacktestPage() -> impl IntoView {
    let store = Store::use_store();

    view! {
        <div class="page backtest-page">
            <div class="card">
                <h6>"Backtest Validation"</h6>
                <p class="page-description">
                    "Validate a selection strategy against historical trade dates."
                </p>
                <button
                    class="btn btn-primary"
                    on:click=move |_| {
                        store.toast("Backtesting is not yet implemented", ToastKind::Info)
                    }
                >
                    "Run Backtest"
                </button>
            </div>
        </div>
    }
}

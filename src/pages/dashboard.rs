use leptos::prelude::*;

use crate::state::{Store, ToastKind};

/// Landing section: factor/model counters from the list endpoints, the
/// last-updated stamp, and shortcuts into the selection workflow.
#[component]
pub fn DashboardPage() -> impl IntoView {
    let store = Store::use_store();

    view! {
        <div class="page dashboard-page">
            <div class="stat-cards">
                <div class="card stat-card">
                    <div class="stat-label">"Active Factors"</div>
                    <div class="stat-value" id="active-factors-count">
                        {move || store.factor_count.get()}
                    </div>
                </div>
                <div class="card stat-card">
                    <div class="stat-label">"Trained Models"</div>
                    <div class="stat-value" id="trained-models-count">
                        {move || store.model_count.get()}
                    </div>
                </div>
                <div class="card stat-card">
                    <div class="stat-label">"Last Updated"</div>
                    <div class="stat-value stat-value-small" id="last-update-time">
                        {move || store.last_update.get().unwrap_or_else(|| "-".to_string())}
                    </div>
                </div>
            </div>

            <div class="card">
                <h6>"Score Distribution"</h6>
                <div class="chart-container"></div>
            </div>

            <div class="quick-actions">
                <button
                    class="btn btn-primary"
                    on:click=move |_| store.switch_section("stock-selection")
                >
                    "Run Stock Selection"
                </button>
                <button
                    class="btn btn-secondary"
                    on:click=move |_| {
                        store.toast("Report generation is not yet implemented", ToastKind::Info)
                    }
                >
                    "Generate Report"
                </button>
            </div>
        </div>
    }
}

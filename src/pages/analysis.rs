use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::{self, SectorAnalysis};
use crate::state::{today_date, Store, ToastKind};

/// Rows requested from, and rendered for, the sector summary.
const SECTOR_TOP_N: u32 = 10;

#[component]
pub fn AnalysisPage() -> impl IntoView {
    let store = Store::use_store();

    let (analysis, set_analysis) = signal::<Option<SectorAnalysis>>(None);
    let (is_running, set_is_running) = signal(false);

    let run_analysis = move |_| {
        let mut trade_date = store.trade_date.get_untracked();
        if trade_date.is_empty() {
            trade_date = today_date();
        }

        set_is_running.set(true);
        spawn_local(async move {
            match api::sector_analysis(&trade_date, SECTOR_TOP_N).await {
                Ok(result) => set_analysis.set(Some(result)),
                Err(e) => {
                    web_sys::console::error_1(
                        &format!("Failed to generate analysis report: {}", e).into(),
                    );
                    store.toast(e, ToastKind::Danger);
                }
            }
            set_is_running.set(false);
        });
    };

    view! {
        <div class="page analysis-page">
            <div class="page-toolbar">
                <button
                    class="btn btn-primary"
                    disabled=move || is_running.get()
                    on:click=run_analysis
                >
                    {move || if is_running.get() { "Analyzing..." } else { "Sector Analysis" }}
                </button>
            </div>

            <div id="analysis-results">
                {move || {
                    analysis
                        .get()
                        .map(|result| {
                            let rows: Vec<_> = result
                                .industry_summary
                                .iter()
                                .take(SECTOR_TOP_N as usize)
                                .cloned()
                                .collect();
                            view! {
                                <h6>"Sector Analysis Report"</h6>
                                <div class="table-responsive">
                                    <table class="table table-sm">
                                        <thead>
                                            <tr>
                                                <th>"Industry"</th>
                                                <th>"Mean Score"</th>
                                                <th>"Stocks"</th>
                                            </tr>
                                        </thead>
                                        <tbody>
                                            {rows
                                                .into_iter()
                                                .map(|row| {
                                                    view! {
                                                        <tr>
                                                            <td>{row.industry}</td>
                                                            <td>
                                                                {format!("{:.4}", row.composite_score_mean)}
                                                            </td>
                                                            <td>{row.composite_score_count}</td>
                                                        </tr>
                                                    }
                                                })
                                                .collect::<Vec<_>>()}
                                        </tbody>
                                    </table>
                                </div>
                            }
                        })
                }}
            </div>
        </div>
    }
}

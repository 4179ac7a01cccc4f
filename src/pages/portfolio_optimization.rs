use std::collections::HashMap;

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::{self, OptimizationConstraints, OptimizationRequest, StockPick};
use crate::export::{build_portfolio_csv, download_csv, PORTFOLIO_CSV_FILENAME};
use crate::state::{Store, ToastKind};

/// Expected-return inputs for the optimizer: each selected stock's
/// effective score keyed by its code.
pub fn build_expected_returns(selection: &[StockPick]) -> HashMap<String, f64> {
    selection
        .iter()
        .map(|stock| (stock.ts_code.clone(), stock.score()))
        .collect()
}

/// Build the optimize request from the current selection and the form
/// inputs. Fails before any network traffic when no selection exists.
/// `max_weight_pct` is the form percentage; the API takes a fraction.
pub fn build_optimization_request(
    selection: &[StockPick],
    method: &str,
    max_weight_pct: f64,
    risk_aversion: f64,
) -> Result<OptimizationRequest, String> {
    if selection.is_empty() {
        return Err("Please run stock selection first".to_string());
    }
    Ok(OptimizationRequest {
        expected_returns: build_expected_returns(selection),
        method: method.to_string(),
        constraints: OptimizationConstraints {
            max_weight: max_weight_pct / 100.0,
            risk_aversion,
        },
    })
}

#[component]
pub fn PortfolioOptimizationPage() -> impl IntoView {
    let store = Store::use_store();

    let (method, set_method) = signal(String::from("mean_variance"));
    let (max_weight, set_max_weight) = signal(String::from("10"));
    let (risk_aversion, set_risk_aversion) = signal(String::from("2.0"));
    let (is_optimizing, set_is_optimizing) = signal(false);

    let run_optimization = move |_| {
        let request = match build_optimization_request(
            &store.selection.get(),
            &method.get(),
            max_weight.get().parse().unwrap_or(10.0),
            risk_aversion.get().parse().unwrap_or(2.0),
        ) {
            Ok(request) => request,
            Err(message) => {
                store.toast(message, ToastKind::Warning);
                return;
            }
        };

        set_is_optimizing.set(true);
        spawn_local(async move {
            match api::optimize_portfolio(&request).await {
                Ok(outcome) => {
                    store.optimization.set(Some(outcome));
                    store.toast("Portfolio optimization finished", ToastKind::Success);
                }
                Err(e) => {
                    web_sys::console::error_1(
                        &format!("Portfolio optimization failed: {}", e).into(),
                    );
                    store.toast(e, ToastKind::Danger);
                }
            }
            set_is_optimizing.set(false);
        });
    };

    let export_portfolio = move |_| {
        let Some(outcome) = store.optimization.get() else {
            store.toast("No portfolio data to export", ToastKind::Warning);
            return;
        };
        let csv = build_portfolio_csv(&outcome.weights);
        match download_csv(PORTFOLIO_CSV_FILENAME, &csv) {
            Ok(()) => store.toast("Portfolio exported", ToastKind::Success),
            Err(e) => {
                web_sys::console::error_1(&format!("CSV export failed: {}", e).into());
                store.toast(e, ToastKind::Danger);
            }
        }
    };

    view! {
        <div class="page portfolio-optimization-page">
            <div class="card optimization-form">
                <div class="form-group">
                    <label>"Optimization Method"</label>
                    <select
                        class="input"
                        id="optimization-method"
                        prop:value=move || method.get()
                        on:change=move |ev| set_method.set(event_target_value(&ev))
                    >
                        <option value="mean_variance">"Mean-Variance"</option>
                        <option value="risk_parity">"Risk Parity"</option>
                        <option value="equal_weight">"Equal Weight"</option>
                    </select>
                </div>
                <div class="form-group">
                    <label>"Max Weight (%)"</label>
                    <input
                        type="number"
                        class="input"
                        id="max-weight"
                        prop:value=move || max_weight.get()
                        on:input=move |ev| set_max_weight.set(event_target_value(&ev))
                    />
                </div>
                <div class="form-group">
                    <label>"Risk Aversion"</label>
                    <input
                        type="number"
                        class="input"
                        id="risk-aversion"
                        prop:value=move || risk_aversion.get()
                        on:input=move |ev| set_risk_aversion.set(event_target_value(&ev))
                    />
                </div>
                <button
                    class="btn btn-primary"
                    disabled=move || is_optimizing.get()
                    on:click=run_optimization
                >
                    {move || if is_optimizing.get() { "Optimizing..." } else { "Run Optimization" }}
                </button>
            </div>

            <div id="optimization-results">
                {move || {
                    store
                        .optimization
                        .get()
                        .map(|outcome| {
                            let stats = outcome.portfolio_stats.clone();
                            let ranked = outcome.ranked_weights();
                            view! {
                                <div class="optimization-summary">
                                    <div class="card">
                                        <h6>"Portfolio Statistics"</h6>
                                        <table class="table table-sm">
                                            <tbody>
                                                <tr>
                                                    <td>"Method"</td>
                                                    <td>{outcome.method.clone()}</td>
                                                </tr>
                                                <tr>
                                                    <td>"Expected Return"</td>
                                                    <td>
                                                        {format!("{:.2}%", stats.expected_return * 100.0)}
                                                    </td>
                                                </tr>
                                                <tr>
                                                    <td>"Expected Risk"</td>
                                                    <td>
                                                        {format!("{:.2}%", stats.expected_risk * 100.0)}
                                                    </td>
                                                </tr>
                                                <tr>
                                                    <td>"Sharpe Ratio"</td>
                                                    <td>{format!("{:.3}", stats.sharpe_ratio)}</td>
                                                </tr>
                                                <tr>
                                                    <td>"Effective Stocks"</td>
                                                    <td>{format!("{:.1}", stats.effective_stocks)}</td>
                                                </tr>
                                            </tbody>
                                        </table>
                                    </div>
                                    <div class="card">
                                        <h6>"Weight Distribution"</h6>
                                        <div class="table-responsive" style="max-height: 200px; overflow-y: auto;">
                                            <table class="table table-sm">
                                                <thead>
                                                    <tr>
                                                        <th>"Code"</th>
                                                        <th>"Weight"</th>
                                                    </tr>
                                                </thead>
                                                <tbody>
                                                    {ranked
                                                        .into_iter()
                                                        .map(|(code, weight)| {
                                                            view! {
                                                                <tr>
                                                                    <td>{code}</td>
                                                                    <td>
                                                                        {format!("{:.2}%", weight * 100.0)}
                                                                    </td>
                                                                </tr>
                                                            }
                                                        })
                                                        .collect::<Vec<_>>()}
                                                </tbody>
                                            </table>
                                        </div>
                                    </div>
                                    <div class="result-actions">
                                        <button class="btn btn-success" on:click=export_portfolio>
                                            "Export Portfolio"
                                        </button>
                                        <button
                                            class="btn btn-info"
                                            on:click=move |_| {
                                                store.toast(
                                                    "Report generation is not yet implemented",
                                                    ToastKind::Info,
                                                );
                                            }
                                        >
                                            "Generate Report"
                                        </button>
                                    </div>
                                </div>
                            }
                        })
                }}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(code: &str, composite: Option<f64>, ensemble: Option<f64>) -> StockPick {
        StockPick {
            ts_code: code.to_string(),
            name: None,
            composite_score: composite,
            ensemble_score: ensemble,
            rank: 1,
            industry: None,
        }
    }

    #[test]
    fn empty_selection_aborts_before_any_request() {
        let err = build_optimization_request(&[], "mean_variance", 10.0, 2.0).unwrap_err();
        assert_eq!(err, "Please run stock selection first");
    }

    #[test]
    fn expected_returns_use_effective_scores() {
        let selection = vec![
            pick("A", Some(0.8), None),
            pick("B", None, Some(0.3)),
            pick("C", None, None),
        ];
        let returns = build_expected_returns(&selection);
        assert_eq!(returns["A"], 0.8);
        assert_eq!(returns["B"], 0.3);
        assert_eq!(returns["C"], 0.0);
    }

    #[test]
    fn max_weight_percentage_becomes_a_fraction() {
        let selection = vec![pick("A", Some(0.5), None)];
        let request = build_optimization_request(&selection, "risk_parity", 15.0, 1.5).unwrap();
        assert_eq!(request.method, "risk_parity");
        assert!((request.constraints.max_weight - 0.15).abs() < 1e-12);
        assert_eq!(request.constraints.risk_aversion, 1.5);
    }
}

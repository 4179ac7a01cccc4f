use std::collections::HashSet;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::api::{self, FactorScoringRequest, ModelScoringRequest};
use crate::state::{SelectionSummary, Store, ToastKind};

pub const DEFAULT_TOP_N: u32 = 50;

/// How stocks are scored: an equal-weighted factor combination or one or
/// more trained models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    FactorBased,
    MlBased,
}

impl SelectionMode {
    pub fn from_value(value: &str) -> SelectionMode {
        if value == "ml_based" {
            SelectionMode::MlBased
        } else {
            SelectionMode::FactorBased
        }
    }
}

#[derive(Debug)]
pub enum SelectionRequest {
    Factors(FactorScoringRequest),
    Models(ModelScoringRequest),
}

/// Build the scoring request for the chosen mode. Fails before any network
/// traffic when nothing is selected in that mode.
pub fn build_selection_request(
    mode: SelectionMode,
    trade_date: &str,
    top_n: u32,
    chosen: Vec<String>,
) -> Result<SelectionRequest, String> {
    match mode {
        SelectionMode::FactorBased => {
            if chosen.is_empty() {
                return Err("Please select at least one factor".to_string());
            }
            Ok(SelectionRequest::Factors(FactorScoringRequest {
                trade_date: trade_date.to_string(),
                top_n,
                factor_list: chosen,
                method: "equal_weight".to_string(),
            }))
        }
        SelectionMode::MlBased => {
            if chosen.is_empty() {
                return Err("Please select at least one model".to_string());
            }
            Ok(SelectionRequest::Models(ModelScoringRequest {
                trade_date: trade_date.to_string(),
                top_n,
                model_ids: chosen,
            }))
        }
    }
}

#[component]
pub fn StockSelectionPage() -> impl IntoView {
    let store = Store::use_store();

    let (method, set_method) = signal(String::from("factor_based"));
    let (top_n, set_top_n) = signal(DEFAULT_TOP_N.to_string());
    let (checked_factors, set_checked_factors) = signal(HashSet::<String>::new());
    let (is_selecting, set_is_selecting) = signal(false);
    let model_select_ref = NodeRef::<leptos::html::Select>::new();

    let selected_models = move || -> Vec<String> {
        let Some(select) = model_select_ref.get() else {
            return Vec::new();
        };
        let options = select.selected_options();
        let mut ids = Vec::new();
        for i in 0..options.length() {
            if let Some(option) = options
                .item(i)
                .and_then(|el| el.dyn_into::<web_sys::HtmlOptionElement>().ok())
            {
                ids.push(option.value());
            }
        }
        ids
    };

    let run_selection = move |_| {
        let mode = SelectionMode::from_value(&method.get());
        let chosen = match mode {
            SelectionMode::FactorBased => {
                let mut ids: Vec<String> = checked_factors.get().into_iter().collect();
                ids.sort();
                ids
            }
            SelectionMode::MlBased => selected_models(),
        };
        let top_n = top_n.get().parse().unwrap_or(DEFAULT_TOP_N);

        let request = match build_selection_request(mode, &store.trade_date.get(), top_n, chosen) {
            Ok(request) => request,
            Err(message) => {
                store.toast(message, ToastKind::Warning);
                return;
            }
        };

        set_is_selecting.set(true);
        spawn_local(async move {
            let result = match &request {
                SelectionRequest::Factors(body) => api::score_by_factors(body).await,
                SelectionRequest::Models(body) => api::score_by_models(body).await,
            };
            match result {
                Ok(scoring) => {
                    store.selection.set(scoring.top_stocks);
                    store.selection_summary.set(Some(SelectionSummary {
                        method: scoring.selection_method,
                        selected_stocks: scoring.selected_stocks,
                    }));
                    store.toast("Stock selection finished", ToastKind::Success);
                }
                Err(e) => {
                    web_sys::console::error_1(&format!("Stock selection failed: {}", e).into());
                    store.toast(e, ToastKind::Danger);
                }
            }
            set_is_selecting.set(false);
        });
    };

    view! {
        <div class="page stock-selection-page">
            <div class="card selection-form">
                <div class="form-group">
                    <label>"Trade Date"</label>
                    <input
                        type="date"
                        class="input"
                        id="trade-date"
                        prop:value=move || store.trade_date.get()
                        on:input=move |ev| store.trade_date.set(event_target_value(&ev))
                    />
                </div>
                <div class="form-group">
                    <label>"Selection Method"</label>
                    <select
                        class="input"
                        id="selection-method"
                        prop:value=move || method.get()
                        on:change=move |ev| set_method.set(event_target_value(&ev))
                    >
                        <option value="factor_based">"Factor-based"</option>
                        <option value="ml_based">"Model-based"</option>
                    </select>
                </div>
                <div class="form-group">
                    <label>"Number of Stocks"</label>
                    <input
                        type="number"
                        class="input"
                        id="top-n"
                        prop:value=move || top_n.get()
                        on:input=move |ev| set_top_n.set(event_target_value(&ev))
                    />
                </div>

                // Factor checkboxes, shown in factor mode only.
                <div
                    class="form-group"
                    id="factor-selection"
                    style:display=move || {
                        if method.get() == "ml_based" { "none" } else { "block" }
                    }
                >
                    <label>"Factors"</label>
                    <div class="factor-checkboxes" id="factor-checkboxes">
                        <For
                            each=move || {
                                store
                                    .factors
                                    .get()
                                    .into_iter()
                                    .filter(|f| f.is_active)
                                    .collect::<Vec<_>>()
                            }
                            key=|factor| factor.factor_id.clone()
                            children=move |factor| {
                                let id = factor.factor_id.clone();
                                let id_checked = id.clone();
                                let label =
                                    format!("{} ({})", factor.factor_name, factor.factor_type);
                                view! {
                                    <div class="form-check">
                                        <input
                                            type="checkbox"
                                            class="form-check-input"
                                            prop:checked=move || {
                                                checked_factors.get().contains(&id_checked)
                                            }
                                            on:change=move |ev| {
                                                let checked = event_target_checked(&ev);
                                                let id = id.clone();
                                                set_checked_factors.update(|set| {
                                                    if checked {
                                                        set.insert(id);
                                                    } else {
                                                        set.remove(&id);
                                                    }
                                                });
                                            }
                                        />
                                        <label class="form-check-label">{label}</label>
                                    </div>
                                }
                            }
                        />
                    </div>
                </div>

                // Model multi-select, shown in model mode only.
                <div
                    class="form-group"
                    id="model-selection"
                    style:display=move || {
                        if method.get() == "ml_based" { "block" } else { "none" }
                    }
                >
                    <label>"Models"</label>
                    <select class="input" id="model-ids" multiple=true node_ref=model_select_ref>
                        <For
                            each=move || {
                                store
                                    .models
                                    .get()
                                    .into_iter()
                                    .filter(|m| m.is_active)
                                    .collect::<Vec<_>>()
                            }
                            key=|model| model.model_id.clone()
                            children=move |model| {
                                let label = format!("{} ({})", model.model_name, model.model_type);
                                view! { <option value=model.model_id.clone()>{label}</option> }
                            }
                        />
                    </select>
                </div>

                <button
                    class="btn btn-primary"
                    disabled=move || is_selecting.get()
                    on:click=run_selection
                >
                    {move || if is_selecting.get() { "Selecting..." } else { "Run Selection" }}
                </button>
            </div>

            <div id="selection-results">
                {move || {
                    store
                        .selection_summary
                        .get()
                        .map(|summary| {
                            let method_label = if summary.method == "ml_based" {
                                "Model-based"
                            } else {
                                "Factor-based"
                            };
                            view! {
                                <div class="selection-summary">
                                    <h6>"Selection Summary"</h6>
                                    <p>{format!("Method: {}", method_label)}</p>
                                    <p>{format!("Stocks selected: {}", summary.selected_stocks)}</p>
                                </div>
                            }
                        })
                }}

                <Show when=move || !store.selection.get().is_empty()>
                    <div class="table-responsive">
                        <table class="table table-sm table-hover">
                            <thead>
                                <tr>
                                    <th>"Code"</th>
                                    <th>"Name"</th>
                                    <th>"Score"</th>
                                    <th>"Rank"</th>
                                    <th>"Industry"</th>
                                    <th>"Actions"</th>
                                </tr>
                            </thead>
                            <tbody>
                                <For
                                    each=move || store.selection.get()
                                    key=|stock| stock.ts_code.clone()
                                    children=move |stock| {
                                        let detail_code = stock.ts_code.clone();
                                        view! {
                                            <tr>
                                                <td>{stock.ts_code.clone()}</td>
                                                <td>
                                                    {stock.name.clone().unwrap_or_else(|| "-".to_string())}
                                                </td>
                                                <td>{format!("{:.4}", stock.score())}</td>
                                                <td>{stock.rank}</td>
                                                <td>
                                                    {stock
                                                        .industry
                                                        .clone()
                                                        .unwrap_or_else(|| "-".to_string())}
                                                </td>
                                                <td>
                                                    <button
                                                        class="btn btn-sm btn-outline-info"
                                                        on:click=move |_| {
                                                            store.toast(
                                                                format!(
                                                                    "Detail view for {} is not yet implemented",
                                                                    detail_code,
                                                                ),
                                                                ToastKind::Info,
                                                            );
                                                        }
                                                    >
                                                        "Detail"
                                                    </button>
                                                </td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </div>
                    <button
                        class="btn btn-primary"
                        on:click=move |_| store.switch_section("portfolio-optimization")
                    >
                        "Optimize Portfolio"
                    </button>
                </Show>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_mode_with_nothing_checked_aborts_locally() {
        let err = build_selection_request(
            SelectionMode::FactorBased,
            "2024-01-02",
            DEFAULT_TOP_N,
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, "Please select at least one factor");
    }

    #[test]
    fn model_mode_with_nothing_selected_aborts_locally() {
        let err =
            build_selection_request(SelectionMode::MlBased, "2024-01-02", DEFAULT_TOP_N, vec![])
                .unwrap_err();
        assert_eq!(err, "Please select at least one model");
    }

    #[test]
    fn factor_mode_builds_equal_weight_request() {
        let request = build_selection_request(
            SelectionMode::FactorBased,
            "2024-01-02",
            20,
            vec!["momentum".to_string()],
        )
        .unwrap();
        match request {
            SelectionRequest::Factors(body) => {
                assert_eq!(body.trade_date, "2024-01-02");
                assert_eq!(body.top_n, 20);
                assert_eq!(body.factor_list, vec!["momentum".to_string()]);
                assert_eq!(body.method, "equal_weight");
            }
            SelectionRequest::Models(_) => panic!("expected a factor request"),
        }
    }

    #[test]
    fn model_mode_builds_model_id_request() {
        let request = build_selection_request(
            SelectionMode::MlBased,
            "2024-01-02",
            10,
            vec!["xgb_5d_v1".to_string()],
        )
        .unwrap();
        match request {
            SelectionRequest::Models(body) => {
                assert_eq!(body.model_ids, vec!["xgb_5d_v1".to_string()]);
                assert_eq!(body.top_n, 10);
            }
            SelectionRequest::Factors(_) => panic!("expected a model request"),
        }
    }

    #[test]
    fn unknown_method_values_fall_back_to_factor_mode() {
        assert_eq!(SelectionMode::from_value("ml_based"), SelectionMode::MlBased);
        assert_eq!(
            SelectionMode::from_value("factor_based"),
            SelectionMode::FactorBased
        );
        assert_eq!(SelectionMode::from_value(""), SelectionMode::FactorBased);
    }
}

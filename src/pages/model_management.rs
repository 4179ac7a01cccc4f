use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api;
use crate::pages::factor_management::display_date;
use crate::state::{confirm, Store, ToastKind};

/// Fixed training window sent with every train request.
const TRAIN_START_DATE: &str = "2023-01-01";
const TRAIN_END_DATE: &str = "2023-12-31";

fn train_model(store: Store, model_id: String) {
    if !confirm("Train this model? It may take a few minutes.") {
        return;
    }
    store.toast("Model training started, please wait...", ToastKind::Info);
    spawn_local(async move {
        match api::train_model(&model_id, TRAIN_START_DATE, TRAIN_END_DATE).await {
            Ok(metrics) => {
                store.toast("Model training finished", ToastKind::Success);
                if let Some(metrics) = metrics {
                    web_sys::console::log_1(&format!("Training metrics: {}", metrics).into());
                }
            }
            Err(e) => {
                web_sys::console::error_1(&format!("Model training failed: {}", e).into());
                store.toast(e, ToastKind::Danger);
            }
        }
    });
}

#[component]
pub fn ModelManagementPage() -> impl IntoView {
    let store = Store::use_store();

    view! {
        <div class="page model-management-page">
            <div class="page-toolbar">
                <button
                    class="btn btn-primary"
                    on:click=move |_| store.show_create_model.set(true)
                >
                    "New Model"
                </button>
            </div>

            <div class="table-responsive">
                <table class="table table-hover" id="models-table">
                    <thead>
                        <tr>
                            <th>"Model ID"</th>
                            <th>"Name"</th>
                            <th>"Type"</th>
                            <th>"Status"</th>
                            <th>"Created"</th>
                            <th>"Actions"</th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || store.models.get()
                            key=|model| model.model_id.clone()
                            children=move |model| {
                                let train_id = model.model_id.clone();
                                let predict_id = model.model_id.clone();
                                let delete_id = model.model_id.clone();
                                let (status_class, status_label) = if model.is_active {
                                    ("badge bg-success", "Active")
                                } else {
                                    ("badge bg-secondary", "Inactive")
                                };
                                let created = display_date(&model.created_at).to_string();
                                view! {
                                    <tr>
                                        <td>{model.model_id.clone()}</td>
                                        <td>{model.model_name.clone()}</td>
                                        <td>
                                            <span class="badge bg-info">
                                                {model.model_type.clone()}
                                            </span>
                                        </td>
                                        <td>
                                            <span class=status_class>{status_label}</span>
                                        </td>
                                        <td>{created}</td>
                                        <td>
                                            <button
                                                class="btn btn-sm btn-outline-primary"
                                                on:click=move |_| {
                                                    train_model(store, train_id.clone());
                                                }
                                            >
                                                "Train"
                                            </button>
                                            <button
                                                class="btn btn-sm btn-outline-success"
                                                on:click=move |_| {
                                                    store.toast(
                                                        format!(
                                                            "Prediction for model {} is not yet implemented",
                                                            predict_id,
                                                        ),
                                                        ToastKind::Info,
                                                    );
                                                }
                                            >
                                                "Predict"
                                            </button>
                                            <button
                                                class="btn btn-sm btn-outline-danger"
                                                on:click=move |_| {
                                                    let prompt = format!(
                                                        "Delete model {}?",
                                                        delete_id,
                                                    );
                                                    if confirm(&prompt) {
                                                        store.toast(
                                                            format!(
                                                                "Deleting model {} is not yet implemented",
                                                                delete_id,
                                                            ),
                                                            ToastKind::Info,
                                                        );
                                                    }
                                                }
                                            >
                                                "Delete"
                                            </button>
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </div>

            <Show when=move || store.models.get().is_empty()>
                <div class="empty-hint">"No models registered yet"</div>
            </Show>
        </div>
    }
}

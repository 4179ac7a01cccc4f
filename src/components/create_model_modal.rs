use std::collections::HashSet;

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::{self, NewModel};
use crate::state::{Section, Store, ToastKind};

/// Validate the create-model form. All fields are required and at least
/// one factor must be selected; the check runs before any request.
pub fn validate_model_form(
    model_id: &str,
    model_name: &str,
    model_type: &str,
    target_type: &str,
    factor_list: &[String],
) -> Result<NewModel, String> {
    if model_id.trim().is_empty()
        || model_name.trim().is_empty()
        || model_type.trim().is_empty()
        || target_type.trim().is_empty()
        || factor_list.is_empty()
    {
        return Err("Please fill in all required fields and select at least one factor".to_string());
    }
    Ok(NewModel {
        model_id: model_id.trim().to_string(),
        model_name: model_name.trim().to_string(),
        model_type: model_type.to_string(),
        target_type: target_type.to_string(),
        factor_list: factor_list.to_vec(),
    })
}

#[component]
pub fn CreateModelModal() -> impl IntoView {
    let store = Store::use_store();

    let (model_id, set_model_id) = signal(String::new());
    let (model_name, set_model_name) = signal(String::new());
    let (model_type, set_model_type) = signal(String::from("random_forest"));
    let (target_type, set_target_type) = signal(String::from("return_5d"));
    let (checked_factors, set_checked_factors) = signal(HashSet::<String>::new());
    let (is_saving, set_is_saving) = signal(false);

    let reset_form = move || {
        set_model_id.set(String::new());
        set_model_name.set(String::new());
        set_model_type.set(String::from("random_forest"));
        set_target_type.set(String::from("return_5d"));
        set_checked_factors.set(HashSet::new());
    };

    let close = move |_| store.show_create_model.set(false);

    let toggle_factor = move |factor_id: String, checked: bool| {
        set_checked_factors.update(|set| {
            if checked {
                set.insert(factor_id);
            } else {
                set.remove(&factor_id);
            }
        });
    };

    let do_create = move |_| {
        let mut factor_list: Vec<String> = checked_factors.get().into_iter().collect();
        factor_list.sort();
        let model = match validate_model_form(
            &model_id.get(),
            &model_name.get(),
            &model_type.get(),
            &target_type.get(),
            &factor_list,
        ) {
            Ok(model) => model,
            Err(message) => {
                store.toast(message, ToastKind::Warning);
                return;
            }
        };

        set_is_saving.set(true);
        spawn_local(async move {
            match api::create_model(&model).await {
                Ok(()) => {
                    store.toast("Model created", ToastKind::Success);
                    store.show_create_model.set(false);
                    reset_form();
                    if store.current_section() == Some(Section::ModelManagement) {
                        store.spawn_load_models();
                    }
                }
                Err(e) => {
                    web_sys::console::error_1(&format!("Failed to create model: {}", e).into());
                    store.toast(e, ToastKind::Danger);
                }
            }
            set_is_saving.set(false);
        });
    };

    view! {
        <Show when=move || store.show_create_model.get()>
            <div class="modal" on:click=close>
                <div class="modal-dialog" on:click=move |ev| ev.stop_propagation()>
                    <div class="modal-content">
                        <h3>"New Model"</h3>
                        <div class="modal-body">
                            <div class="form-group">
                                <label>"Model ID *"</label>
                                <input
                                    type="text"
                                    class="input"
                                    placeholder="e.g. xgb_5d_v1"
                                    prop:value=move || model_id.get()
                                    on:input=move |ev| set_model_id.set(event_target_value(&ev))
                                />
                            </div>
                            <div class="form-group">
                                <label>"Model Name *"</label>
                                <input
                                    type="text"
                                    class="input"
                                    prop:value=move || model_name.get()
                                    on:input=move |ev| set_model_name.set(event_target_value(&ev))
                                />
                            </div>
                            <div class="form-group">
                                <label>"Model Type *"</label>
                                <select
                                    class="input"
                                    prop:value=move || model_type.get()
                                    on:change=move |ev| set_model_type.set(event_target_value(&ev))
                                >
                                    <option value="random_forest">"Random Forest"</option>
                                    <option value="xgboost">"XGBoost"</option>
                                    <option value="lightgbm">"LightGBM"</option>
                                </select>
                            </div>
                            <div class="form-group">
                                <label>"Prediction Target *"</label>
                                <select
                                    class="input"
                                    prop:value=move || target_type.get()
                                    on:change=move |ev| set_target_type.set(event_target_value(&ev))
                                >
                                    <option value="return_1d">"1-day return"</option>
                                    <option value="return_5d">"5-day return"</option>
                                    <option value="return_20d">"20-day return"</option>
                                </select>
                            </div>
                            <div class="form-group">
                                <label>"Factors *"</label>
                                <div class="factor-checkboxes">
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
                                                            toggle_factor(
                                                                id.clone(),
                                                                event_target_checked(&ev),
                                                            );
                                                        }
                                                    />
                                                    <label class="form-check-label">{label}</label>
                                                </div>
                                            }
                                        }
                                    />
                                </div>
                            </div>
                        </div>
                        <div class="modal-actions">
                            <button class="btn btn-secondary" on:click=close>
                                "Cancel"
                            </button>
                            <button
                                class="btn btn-primary"
                                disabled=move || is_saving.get()
                                on:click=do_create
                            >
                                {move || if is_saving.get() { "Creating..." } else { "Create Model" }}
                            </button>
                        </div>
                    </div>
                </div>
            </div>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_requires_every_field_and_a_factor() {
        let factors = vec!["f1".to_string()];
        assert!(validate_model_form("", "M", "xgboost", "return_5d", &factors).is_err());
        assert!(validate_model_form("m1", "", "xgboost", "return_5d", &factors).is_err());
        assert!(validate_model_form("m1", "M", "", "return_5d", &factors).is_err());
        assert!(validate_model_form("m1", "M", "xgboost", "", &factors).is_err());
        assert!(validate_model_form("m1", "M", "xgboost", "return_5d", &[]).is_err());
    }

    #[test]
    fn valid_form_builds_the_request() {
        let factors = vec!["f1".to_string(), "f2".to_string()];
        let model = validate_model_form("m1", "Growth", "xgboost", "return_5d", &factors).unwrap();
        assert_eq!(model.model_id, "m1");
        assert_eq!(model.factor_list, factors);
    }
}

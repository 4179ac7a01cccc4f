use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::{self, NewFactor};
use crate::state::{Section, Store, ToastKind};

/// Validate the create-factor form. Every field except the description is
/// required; the check runs before any request is sent.
pub fn validate_factor_form(
    factor_id: &str,
    factor_name: &str,
    factor_type: &str,
    factor_formula: &str,
    description: &str,
) -> Result<NewFactor, String> {
    if factor_id.trim().is_empty()
        || factor_name.trim().is_empty()
        || factor_type.trim().is_empty()
        || factor_formula.trim().is_empty()
    {
        return Err("Please fill in all required fields".to_string());
    }
    Ok(NewFactor {
        factor_id: factor_id.trim().to_string(),
        factor_name: factor_name.trim().to_string(),
        factor_type: factor_type.to_string(),
        factor_formula: factor_formula.trim().to_string(),
        description: description.trim().to_string(),
    })
}

#[component]
pub fn CreateFactorModal() -> impl IntoView {
    let store = Store::use_store();

    let (factor_id, set_factor_id) = signal(String::new());
    let (factor_name, set_factor_name) = signal(String::new());
    let (factor_type, set_factor_type) = signal(String::from("technical"));
    let (factor_formula, set_factor_formula) = signal(String::new());
    let (description, set_description) = signal(String::new());
    let (is_saving, set_is_saving) = signal(false);

    let reset_form = move || {
        set_factor_id.set(String::new());
        set_factor_name.set(String::new());
        set_factor_type.set(String::from("technical"));
        set_factor_formula.set(String::new());
        set_description.set(String::new());
    };

    let close = move |_| store.show_create_factor.set(false);

    let do_create = move |_| {
        let factor = match validate_factor_form(
            &factor_id.get(),
            &factor_name.get(),
            &factor_type.get(),
            &factor_formula.get(),
            &description.get(),
        ) {
            Ok(factor) => factor,
            Err(message) => {
                store.toast(message, ToastKind::Warning);
                return;
            }
        };

        set_is_saving.set(true);
        spawn_local(async move {
            match api::create_factor(&factor).await {
                Ok(()) => {
                    store.toast("Factor created", ToastKind::Success);
                    store.show_create_factor.set(false);
                    reset_form();
                    if store.current_section() == Some(Section::FactorManagement) {
                        store.spawn_load_factors();
                    }
                }
                Err(e) => {
                    web_sys::console::error_1(&format!("Failed to create factor: {}", e).into());
                    store.toast(e, ToastKind::Danger);
                }
            }
            set_is_saving.set(false);
        });
    };

    view! {
        <Show when=move || store.show_create_factor.get()>
            <div class="modal" on:click=close>
                <div class="modal-dialog" on:click=move |ev| ev.stop_propagation()>
                    <div class="modal-content">
                        <h3>"New Factor"</h3>
                        <div class="modal-body">
                            <div class="form-group">
                                <label>"Factor ID *"</label>
                                <input
                                    type="text"
                                    class="input"
                                    placeholder="e.g. momentum_20d"
                                    prop:value=move || factor_id.get()
                                    on:input=move |ev| set_factor_id.set(event_target_value(&ev))
                                />
                            </div>
                            <div class="form-group">
                                <label>"Factor Name *"</label>
                                <input
                                    type="text"
                                    class="input"
                                    prop:value=move || factor_name.get()
                                    on:input=move |ev| set_factor_name.set(event_target_value(&ev))
                                />
                            </div>
                            <div class="form-group">
                                <label>"Factor Type *"</label>
                                <select
                                    class="input"
                                    prop:value=move || factor_type.get()
                                    on:change=move |ev| set_factor_type.set(event_target_value(&ev))
                                >
                                    <option value="technical">"Technical"</option>
                                    <option value="fundamental">"Fundamental"</option>
                                    <option value="momentum">"Momentum"</option>
                                    <option value="volatility">"Volatility"</option>
                                </select>
                            </div>
                            <div class="form-group">
                                <label>"Formula *"</label>
                                <textarea
                                    class="input"
                                    placeholder="Factor expression over price and fundamental fields"
                                    prop:value=move || factor_formula.get()
                                    on:input=move |ev| set_factor_formula.set(event_target_value(&ev))
                                ></textarea>
                            </div>
                            <div class="form-group">
                                <label>"Description"</label>
                                <textarea
                                    class="input"
                                    prop:value=move || description.get()
                                    on:input=move |ev| set_description.set(event_target_value(&ev))
                                ></textarea>
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
                                {move || if is_saving.get() { "Creating..." } else { "Create Factor" }}
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
    fn all_required_fields_must_be_present() {
        assert!(validate_factor_form("", "Momentum", "technical", "ts_rank(close, 20)", "").is_err());
        assert!(validate_factor_form("f1", "", "technical", "ts_rank(close, 20)", "").is_err());
        assert!(validate_factor_form("f1", "Momentum", "", "ts_rank(close, 20)", "").is_err());
        assert!(validate_factor_form("f1", "Momentum", "technical", "", "").is_err());
    }

    #[test]
    fn description_is_optional() {
        let factor =
            validate_factor_form("f1", "Momentum", "technical", "ts_rank(close, 20)", "").unwrap();
        assert_eq!(factor.factor_id, "f1");
        assert_eq!(factor.description, "");
    }

    #[test]
    fn whitespace_only_fields_are_rejected() {
        assert!(validate_factor_form("  ", "Momentum", "technical", "x", "").is_err());
    }
}

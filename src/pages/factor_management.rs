use leptos::prelude::*;

use crate::state::{confirm, Store, ToastKind};

/// Date portion of a server timestamp for table display.
pub fn display_date(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

#[component]
pub fn FactorManagementPage() -> impl IntoView {
    let store = Store::use_store();

    view! {
        <div class="page factor-management-page">
            <div class="page-toolbar">
                <button
                    class="btn btn-primary"
                    on:click=move |_| store.show_create_factor.set(true)
                >
                    "New Factor"
                </button>
            </div>

            <div class="table-responsive">
                <table class="table table-hover" id="factors-table">
                    <thead>
                        <tr>
                            <th>"Factor ID"</th>
                            <th>"Name"</th>
                            <th>"Type"</th>
                            <th>"Status"</th>
                            <th>"Created"</th>
                            <th>"Actions"</th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || store.factors.get()
                            key=|factor| factor.factor_id.clone()
                            children=move |factor| {
                                let edit_id = factor.factor_id.clone();
                                let delete_id = factor.factor_id.clone();
                                let (status_class, status_label) = if factor.is_active {
                                    ("badge bg-success", "Active")
                                } else {
                                    ("badge bg-secondary", "Inactive")
                                };
                                let created = display_date(&factor.created_at).to_string();
                                view! {
                                    <tr>
                                        <td>{factor.factor_id.clone()}</td>
                                        <td>{factor.factor_name.clone()}</td>
                                        <td>
                                            <span class="badge bg-primary">
                                                {factor.factor_type.clone()}
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
                                                    store.toast(
                                                        format!(
                                                            "Editing factor {} is not yet implemented",
                                                            edit_id,
                                                        ),
                                                        ToastKind::Info,
                                                    );
                                                }
                                            >
                                                "Edit"
                                            </button>
                                            <button
                                                class="btn btn-sm btn-outline-danger"
                                                on:click=move |_| {
                                                    let prompt = format!(
                                                        "Delete factor {}?",
                                                        delete_id,
                                                    );
                                                    if confirm(&prompt) {
                                                        store.toast(
                                                            format!(
                                                                "Deleting factor {} is not yet implemented",
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

            <Show when=move || store.factors.get().is_empty()>
                <div class="empty-hint">"No factors registered yet"</div>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_date_strips_the_time_part() {
        assert_eq!(display_date("2024-01-01T08:30:00"), "2024-01-01");
        assert_eq!(display_date("2024-01-01"), "2024-01-01");
    }
}

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::api::{self, FactorRecord, ModelRecord, OptimizationOutcome, StockPick};

/// Title shown when no known section is selected.
pub const DEFAULT_TITLE: &str = "Multi-Factor Stock Selection";

/// The fixed set of console sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Dashboard,
    FactorManagement,
    ModelManagement,
    StockSelection,
    PortfolioOptimization,
    Analysis,
    Backtest,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Dashboard,
        Section::FactorManagement,
        Section::ModelManagement,
        Section::StockSelection,
        Section::PortfolioOptimization,
        Section::Analysis,
        Section::Backtest,
    ];

    pub fn from_name(name: &str) -> Option<Section> {
        match name {
            "dashboard" => Some(Section::Dashboard),
            "factor-management" => Some(Section::FactorManagement),
            "model-management" => Some(Section::ModelManagement),
            "stock-selection" => Some(Section::StockSelection),
            "portfolio-optimization" => Some(Section::PortfolioOptimization),
            "analysis" => Some(Section::Analysis),
            "backtest" => Some(Section::Backtest),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Section::Dashboard => "dashboard",
            Section::FactorManagement => "factor-management",
            Section::ModelManagement => "model-management",
            Section::StockSelection => "stock-selection",
            Section::PortfolioOptimization => "portfolio-optimization",
            Section::Analysis => "analysis",
            Section::Backtest => "backtest",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::FactorManagement => "Factor Management",
            Section::ModelManagement => "Model Management",
            Section::StockSelection => "Stock Selection",
            Section::PortfolioOptimization => "Portfolio Optimization",
            Section::Analysis => "Analysis Reports",
            Section::Backtest => "Backtest Validation",
        }
    }
}

/// View-switcher state. `active` drives the navigation highlight and page
/// title; `visible` is the section whose content is shown. The two only
/// diverge after a request for an unrecognized section name, which clears
/// the highlight but leaves the content as it was.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub active: Option<Section>,
    pub visible: Section,
}

impl ViewState {
    pub fn new() -> Self {
        ViewState {
            active: Some(Section::Dashboard),
            visible: Section::Dashboard,
        }
    }

    /// Switch to the section with the given name. Returns the recognized
    /// section so the caller can trigger its data loads; unknown names are
    /// accepted without error and return `None`.
    pub fn switch(&mut self, name: &str) -> Option<Section> {
        match Section::from_name(name) {
            Some(section) => {
                self.active = Some(section);
                self.visible = section;
                Some(section)
            }
            None => {
                self.active = None;
                None
            }
        }
    }

    pub fn title(&self) -> &'static str {
        self.active.map(Section::title).unwrap_or(DEFAULT_TITLE)
    }
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::new()
    }
}

// -- Toasts --

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
    Warning,
    Danger,
}

impl ToastKind {
    pub fn css_class(self) -> &'static str {
        match self {
            ToastKind::Success => "alert alert-success",
            ToastKind::Info => "alert alert-info",
            ToastKind::Warning => "alert alert-warning",
            ToastKind::Danger => "alert alert-danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u32,
    pub message: String,
    pub kind: ToastKind,
}

/// How long a toast stays on screen before removing itself.
const TOAST_LIFETIME_MS: i32 = 3000;

/// Summary line rendered above the selection results table.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSummary {
    pub method: String,
    pub selected_stocks: u32,
}

/// The application store: every piece of shared mutable state, reachable
/// through context instead of globals.
#[derive(Clone, Copy)]
pub struct Store {
    pub view: RwSignal<ViewState>,
    pub factors: RwSignal<Vec<FactorRecord>>,
    pub factor_count: RwSignal<u32>,
    pub models: RwSignal<Vec<ModelRecord>>,
    pub model_count: RwSignal<u32>,
    pub selection: RwSignal<Vec<StockPick>>,
    pub selection_summary: RwSignal<Option<SelectionSummary>>,
    pub optimization: RwSignal<Option<OptimizationOutcome>>,
    pub trade_date: RwSignal<String>,
    pub last_update: RwSignal<Option<String>>,
    pub toasts: RwSignal<Vec<Toast>>,
    pub show_create_factor: RwSignal<bool>,
    pub show_create_model: RwSignal<bool>,
    next_toast_id: RwSignal<u32>,
}

impl Store {
    pub fn new() -> Self {
        Store {
            view: RwSignal::new(ViewState::new()),
            factors: RwSignal::new(Vec::new()),
            factor_count: RwSignal::new(0),
            models: RwSignal::new(Vec::new()),
            model_count: RwSignal::new(0),
            selection: RwSignal::new(Vec::new()),
            selection_summary: RwSignal::new(None),
            optimization: RwSignal::new(None),
            trade_date: RwSignal::new(String::new()),
            last_update: RwSignal::new(None),
            toasts: RwSignal::new(Vec::new()),
            show_create_factor: RwSignal::new(false),
            show_create_model: RwSignal::new(false),
            next_toast_id: RwSignal::new(0),
        }
    }

    pub fn use_store() -> Store {
        expect_context::<Store>()
    }

    /// Switch sections by name and kick off that section's data loads.
    pub fn switch_section(self, name: &str) {
        let loaded = self.view.try_update(|view| view.switch(name)).flatten();
        match loaded {
            Some(Section::FactorManagement) => self.spawn_load_factors(),
            Some(Section::ModelManagement) => self.spawn_load_models(),
            Some(Section::StockSelection) => {
                // Selection needs both the factor checkboxes and the model
                // options to be current.
                self.spawn_load_factors();
                self.spawn_load_models();
            }
            _ => {}
        }
    }

    pub fn current_section(self) -> Option<Section> {
        self.view.get_untracked().active
    }

    // -- Toast helpers --

    pub fn toast(self, message: impl Into<String>, kind: ToastKind) {
        let id = self.next_toast_id.get_untracked();
        self.next_toast_id.set(id + 1);
        self.toasts.update(|toasts| {
            toasts.push(Toast {
                id,
                message: message.into(),
                kind,
            })
        });
        self.schedule_toast_removal(id);
    }

    pub fn dismiss_toast(self, id: u32) {
        self.toasts.update(|toasts| toasts.retain(|t| t.id != id));
    }

    fn schedule_toast_removal(self, id: u32) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback = Closure::once(move || {
            self.dismiss_toast(id);
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            TOAST_LIFETIME_MS,
        );
        callback.forget();
    }

    // -- List loaders --

    /// Fetch the factor list into the store. On any failure the previous
    /// list is left untouched.
    pub async fn load_factors(self) {
        match api::list_factors().await {
            Ok(list) => {
                self.factor_count.set(list.total_count);
                self.factors.set(list.factors);
            }
            Err(e) => {
                web_sys::console::error_1(&format!("Failed to load factor list: {}", e).into());
                self.toast("Failed to load factor list", ToastKind::Danger);
            }
        }
    }

    /// Fetch the model list into the store. On any failure the previous
    /// list is left untouched.
    pub async fn load_models(self) {
        match api::list_models().await {
            Ok(list) => {
                self.model_count.set(list.total_count);
                self.models.set(list.models);
            }
            Err(e) => {
                web_sys::console::error_1(&format!("Failed to load model list: {}", e).into());
                self.toast("Failed to load model list", ToastKind::Danger);
            }
        }
    }

    pub fn spawn_load_factors(self) {
        wasm_bindgen_futures::spawn_local(async move {
            self.load_factors().await;
        });
    }

    pub fn spawn_load_models(self) {
        wasm_bindgen_futures::spawn_local(async move {
            self.load_models().await;
        });
    }

    /// Initial dashboard load: both counters plus the last-updated stamp.
    pub async fn load_dashboard(self) {
        self.load_factors().await;
        self.load_models().await;
        self.last_update.set(Some(now_locale_string()));
    }

    /// Re-run the loads of whichever section is current.
    pub fn refresh_current_section(self) {
        match self.current_section() {
            Some(Section::Dashboard) => {
                wasm_bindgen_futures::spawn_local(async move {
                    self.load_dashboard().await;
                });
            }
            Some(Section::FactorManagement) => self.spawn_load_factors(),
            Some(Section::ModelManagement) => self.spawn_load_models(),
            Some(Section::StockSelection) => {
                self.spawn_load_factors();
                self.spawn_load_models();
            }
            _ => {}
        }
        self.toast("Data refreshed", ToastKind::Success);
    }
}

impl Default for Store {
    fn default() -> Self {
        Store::new()
    }
}

/// Local date-time string for the dashboard's last-updated stamp.
fn now_locale_string() -> String {
    js_sys::Date::new_0()
        .to_locale_string("default", &JsValue::UNDEFINED)
        .into()
}

fn iso_date(date: &js_sys::Date) -> String {
    let iso: String = date.to_iso_string().into();
    iso.split('T').next().unwrap_or("").to_string()
}

/// Yesterday in `YYYY-MM-DD`, the default trade date on page load.
pub fn default_trade_date() -> String {
    let date = js_sys::Date::new_0();
    date.set_date(date.get_date() - 1);
    iso_date(&date)
}

/// Today in `YYYY-MM-DD`.
pub fn today_date() -> String {
    iso_date(&js_sys::Date::new_0())
}

/// Native confirmation dialog; destructive placeholder actions gate on it.
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_shows_exactly_the_requested_section() {
        let mut view = ViewState::new();
        for section in Section::ALL {
            let loaded = view.switch(section.name());
            assert_eq!(loaded, Some(section));
            assert_eq!(view.active, Some(section));
            assert_eq!(view.visible, section);
        }
    }

    #[test]
    fn unknown_section_clears_highlight_and_keeps_content() {
        let mut view = ViewState::new();
        view.switch("portfolio-optimization");
        let loaded = view.switch("no-such-section");
        assert_eq!(loaded, None);
        assert_eq!(view.active, None);
        assert_eq!(view.visible, Section::PortfolioOptimization);
        assert_eq!(view.title(), DEFAULT_TITLE);
    }

    #[test]
    fn titles_come_from_the_section_lookup() {
        let mut view = ViewState::new();
        view.switch("factor-management");
        assert_eq!(view.title(), "Factor Management");
        view.switch("backtest");
        assert_eq!(view.title(), "Backtest Validation");
    }

    #[test]
    fn section_names_round_trip() {
        for section in Section::ALL {
            assert_eq!(Section::from_name(section.name()), Some(section));
        }
        assert_eq!(Section::from_name("settings"), None);
    }
}

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::components::create_factor_modal::CreateFactorModal;
use crate::components::create_model_modal::CreateModelModal;
use crate::components::navbar::Navbar;
use crate::components::sidebar::Sidebar;
use crate::components::toast::ToastHost;
use crate::pages::analysis::AnalysisPage;
use crate::pages::backtest::BacktestPage;
use crate::pages::dashboard::DashboardPage;
use crate::pages::factor_management::FactorManagementPage;
use crate::pages::model_management::ModelManagementPage;
use crate::pages::portfolio_optimization::PortfolioOptimizationPage;
use crate::pages::stock_selection::StockSelectionPage;
use crate::responsive::{self, DeviceProfile};
use crate::state::{default_trade_date, Section, Store};

/// One section container. Every section stays mounted; the switcher only
/// toggles which one is displayed, so hidden forms keep their input state.
#[component]
fn SectionPanel(section: Section, children: Children) -> impl IntoView {
    let store = Store::use_store();
    let visible = move || store.view.get().visible == section;

    view! {
        <section
            id=section.name()
            class="content-section"
            class:active=visible
            style:display=move || if visible() { "block" } else { "none" }
        >
            {children()}
        </section>
    }
}

#[component]
pub fn App() -> impl IntoView {
    let store = Store::new();
    provide_context(store);

    store.trade_date.set(default_trade_date());

    // Initial dashboard load.
    Effect::new(move |_| {
        spawn_local(async move {
            store.load_dashboard().await;
        });
    });

    // Mobile adjustments after the first render. No chart library is
    // bundled in this build, so no chart adapter is passed.
    Effect::new(move |_| {
        responsive::init(DeviceProfile::detect(), None);
    });

    view! {
        <div class="app-layout">
            <Sidebar />
            <div class="app-main">
                <Navbar />
                <main class="content">
                    <SectionPanel section=Section::Dashboard>
                        <DashboardPage />
                    </SectionPanel>
                    <SectionPanel section=Section::FactorManagement>
                        <FactorManagementPage />
                    </SectionPanel>
                    <SectionPanel section=Section::ModelManagement>
                        <ModelManagementPage />
                    </SectionPanel>
                    <SectionPanel section=Section::StockSelection>
                        <StockSelectionPage />
                    </SectionPanel>
                    <SectionPanel section=Section::PortfolioOptimization>
                        <PortfolioOptimizationPage />
                    </SectionPanel>
                    <SectionPanel section=Section::Analysis>
                        <AnalysisPage />
                    </SectionPanel>
                    <SectionPanel section=Section::Backtest>
                        <BacktestPage />
                    </SectionPanel>
                </main>
            </div>

            <ToastHost />
            <CreateFactorModal />
            <CreateModelModal />
        </div>
    }
}

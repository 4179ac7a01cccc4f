use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

/// Base path of the multi-factor API; every endpoint below hangs off this.
pub const API_BASE_URL: &str = "/api/ml-factor";

fn js_error(e: JsValue) -> String {
    e.as_string()
        .unwrap_or_else(|| "Network request failed".to_string())
}

async fn fetch_json<T: DeserializeOwned>(method: &str, path: &str, body: Option<String>) -> Result<T, String> {
    let opts = RequestInit::new();
    opts.set_method(method);
    if let Some(payload) = body {
        opts.set_body(&JsValue::from_str(&payload));
    }

    let url = format!("{}{}", API_BASE_URL, path);
    let request = Request::new_with_str_and_init(&url, &opts).map_err(js_error)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(js_error)?;

    let window = web_sys::window().ok_or_else(|| "No window".to_string())?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| "Unexpected fetch result".to_string())?;

    let json_promise = resp.json().map_err(js_error)?;
    let json = JsFuture::from(json_promise).await.map_err(js_error)?;
    serde_wasm_bindgen::from_value(json).map_err(|e| e.to_string())
}

async fn get_json<T: DeserializeOwned>(path: &str) -> Result<T, String> {
    fetch_json("GET", path, None).await
}

async fn post_json<T: DeserializeOwned, B: Serialize>(path: &str, body: &B) -> Result<T, String> {
    let payload = serde_json::to_string(body).map_err(|e| e.to_string())?;
    fetch_json("POST", path, Some(payload)).await
}

// -- Factor and model records --

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FactorRecord {
    pub factor_id: String,
    pub factor_name: String,
    pub factor_type: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelRecord {
    pub model_id: String,
    pub model_name: String,
    pub model_type: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Deserialize)]
struct FactorListEnvelope {
    success: bool,
    #[serde(default)]
    factors: Vec<FactorRecord>,
    #[serde(default)]
    total_count: u32,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ModelListEnvelope {
    success: bool,
    #[serde(default)]
    models: Vec<ModelRecord>,
    #[serde(default)]
    total_count: u32,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FactorList {
    pub factors: Vec<FactorRecord>,
    pub total_count: u32,
}

#[derive(Debug, Clone)]
pub struct ModelList {
    pub models: Vec<ModelRecord>,
    pub total_count: u32,
}

/// List all registered factors.
pub async fn list_factors() -> Result<FactorList, String> {
    let envelope: FactorListEnvelope = get_json("/factors/list").await?;
    if envelope.success {
        Ok(FactorList {
            factors: envelope.factors,
            total_count: envelope.total_count,
        })
    } else {
        Err(envelope
            .error
            .unwrap_or_else(|| "Failed to load factor list".to_string()))
    }
}

/// List all registered models.
pub async fn list_models() -> Result<ModelList, String> {
    let envelope: ModelListEnvelope = get_json("/models/list").await?;
    if envelope.success {
        Ok(ModelList {
            models: envelope.models,
            total_count: envelope.total_count,
        })
    } else {
        Err(envelope
            .error
            .unwrap_or_else(|| "Failed to load model list".to_string()))
    }
}

// -- Create factor / model --

#[derive(Debug, Clone, Serialize)]
pub struct NewFactor {
    pub factor_id: String,
    pub factor_name: String,
    pub factor_type: String,
    pub factor_formula: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewModel {
    pub model_id: String,
    pub model_name: String,
    pub model_type: String,
    pub target_type: String,
    pub factor_list: Vec<String>,
}

#[derive(Deserialize)]
struct AckEnvelope {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Register a custom factor definition.
pub async fn create_factor(factor: &NewFactor) -> Result<(), String> {
    let envelope: AckEnvelope = post_json("/factors/custom", factor).await?;
    if envelope.success {
        Ok(())
    } else {
        Err(envelope
            .error
            .unwrap_or_else(|| "Failed to create factor".to_string()))
    }
}

/// Register a model definition over a set of factors.
pub async fn create_model(model: &NewModel) -> Result<(), String> {
    let envelope: AckEnvelope = post_json("/models/create", model).await?;
    if envelope.success {
        Ok(())
    } else {
        Err(envelope
            .error
            .unwrap_or_else(|| "Failed to create model".to_string()))
    }
}

// -- Model training --

#[derive(Serialize)]
struct TrainRequest<'a> {
    model_id: &'a str,
    start_date: &'a str,
    end_date: &'a str,
}

#[derive(Deserialize)]
struct TrainEnvelope {
    success: bool,
    #[serde(default)]
    metrics: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Kick off a training run for a model over a fixed date range.
/// Returns the training metrics the server reports, if any.
pub async fn train_model(
    model_id: &str,
    start_date: &str,
    end_date: &str,
) -> Result<Option<serde_json::Value>, String> {
    let envelope: TrainEnvelope = post_json(
        "/models/train",
        &TrainRequest {
            model_id,
            start_date,
            end_date,
        },
    )
    .await?;
    if envelope.success {
        Ok(envelope.metrics)
    } else {
        Err(envelope
            .error
            .unwrap_or_else(|| "Model training failed".to_string()))
    }
}

// -- Stock scoring --

/// One ranked stock from a scoring run. Factor-based scoring reports
/// `composite_score`, model-based scoring reports `ensemble_score`; either
/// may be absent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StockPick {
    pub ts_code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub composite_score: Option<f64>,
    #[serde(default)]
    pub ensemble_score: Option<f64>,
    pub rank: u32,
    #[serde(default)]
    pub industry: Option<String>,
}

impl StockPick {
    /// Effective score with explicit precedence: composite first, then
    /// ensemble, then zero.
    pub fn score(&self) -> f64 {
        self.composite_score
            .or(self.ensemble_score)
            .unwrap_or(0.0)
    }
}

#[derive(Serialize, Debug)]
pub struct FactorScoringRequest {
    pub trade_date: String,
    pub top_n: u32,
    pub factor_list: Vec<String>,
    pub method: String,
}

#[derive(Serialize, Debug)]
pub struct ModelScoringRequest {
    pub trade_date: String,
    pub top_n: u32,
    pub model_ids: Vec<String>,
}

#[derive(Deserialize)]
struct ScoringEnvelope {
    success: bool,
    #[serde(default)]
    top_stocks: Vec<StockPick>,
    #[serde(default)]
    selected_stocks: Option<u32>,
    #[serde(default)]
    selection_method: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScoringResult {
    pub top_stocks: Vec<StockPick>,
    pub selected_stocks: u32,
    pub selection_method: String,
}

fn scoring_result(envelope: ScoringEnvelope, fallback_error: &str) -> Result<ScoringResult, String> {
    if envelope.success {
        let count = envelope
            .selected_stocks
            .unwrap_or(envelope.top_stocks.len() as u32);
        Ok(ScoringResult {
            top_stocks: envelope.top_stocks,
            selected_stocks: count,
            selection_method: envelope.selection_method.unwrap_or_default(),
        })
    } else {
        Err(envelope.error.unwrap_or_else(|| fallback_error.to_string()))
    }
}

/// Score stocks with an equal-weighted combination of factors.
pub async fn score_by_factors(request: &FactorScoringRequest) -> Result<ScoringResult, String> {
    let envelope: ScoringEnvelope = post_json("/scoring/factor-based", request).await?;
    scoring_result(envelope, "Stock selection failed")
}

/// Score stocks with one or more trained models.
pub async fn score_by_models(request: &ModelScoringRequest) -> Result<ScoringResult, String> {
    let envelope: ScoringEnvelope = post_json("/scoring/ml-based", request).await?;
    scoring_result(envelope, "Stock selection failed")
}

// -- Portfolio optimization --

#[derive(Serialize, Debug)]
pub struct OptimizationConstraints {
    pub max_weight: f64,
    pub risk_aversion: f64,
}

#[derive(Serialize, Debug)]
pub struct OptimizationRequest {
    pub expected_returns: std::collections::HashMap<String, f64>,
    pub method: String,
    pub constraints: OptimizationConstraints,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PortfolioStats {
    pub expected_return: f64,
    pub expected_risk: f64,
    pub sharpe_ratio: f64,
    pub effective_stocks: f64,
}

#[derive(Deserialize)]
struct OptimizationEnvelope {
    success: bool,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    weights: std::collections::HashMap<String, f64>,
    #[serde(default)]
    portfolio_stats: Option<PortfolioStats>,
    #[serde(default)]
    error: Option<String>,
}

/// A completed optimization run, held until the next run or page reload.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationOutcome {
    pub method: String,
    pub weights: std::collections::HashMap<String, f64>,
    pub portfolio_stats: PortfolioStats,
}

/// Weights above the reporting threshold, heaviest first. Entries at or
/// below 0.001 are dropped; ties break on stock code so the order is stable.
pub const WEIGHT_THRESHOLD: f64 = 0.001;

impl OptimizationOutcome {
    pub fn ranked_weights(&self) -> Vec<(String, f64)> {
        ranked_weights(&self.weights)
    }
}

pub fn ranked_weights(weights: &std::collections::HashMap<String, f64>) -> Vec<(String, f64)> {
    let mut entries: Vec<(String, f64)> = weights
        .iter()
        .filter(|(_, w)| **w > WEIGHT_THRESHOLD)
        .map(|(code, w)| (code.clone(), *w))
        .collect();
    entries.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    entries
}

/// Request portfolio weights for the given expected returns.
pub async fn optimize_portfolio(request: &OptimizationRequest) -> Result<OptimizationOutcome, String> {
    let envelope: OptimizationEnvelope = post_json("/portfolio/optimize", request).await?;
    if envelope.success {
        let stats = envelope
            .portfolio_stats
            .ok_or_else(|| "Optimization response missing portfolio stats".to_string())?;
        Ok(OptimizationOutcome {
            method: envelope.method.unwrap_or_default(),
            weights: envelope.weights,
            portfolio_stats: stats,
        })
    } else {
        Err(envelope
            .error
            .unwrap_or_else(|| "Portfolio optimization failed".to_string()))
    }
}

// -- Sector analysis --

#[derive(Serialize)]
struct SectorAnalysisRequest<'a> {
    trade_date: &'a str,
    top_n: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndustrySummaryRow {
    pub industry: String,
    pub composite_score_mean: f64,
    pub composite_score_count: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectorAnalysis {
    #[serde(default)]
    pub industry_summary: Vec<IndustrySummaryRow>,
}

#[derive(Deserialize)]
struct SectorAnalysisEnvelope {
    success: bool,
    #[serde(default)]
    analysis: Option<SectorAnalysis>,
    #[serde(default)]
    error: Option<String>,
}

/// Aggregate the latest scores by industry.
pub async fn sector_analysis(trade_date: &str, top_n: u32) -> Result<SectorAnalysis, String> {
    let envelope: SectorAnalysisEnvelope =
        post_json("/analysis/sector", &SectorAnalysisRequest { trade_date, top_n }).await?;
    if envelope.success {
        Ok(envelope.analysis.unwrap_or_default())
    } else {
        Err(envelope
            .error
            .unwrap_or_else(|| "Failed to generate analysis report".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

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
    fn score_prefers_composite_over_ensemble() {
        assert_eq!(pick("A", Some(0.7), Some(0.2)).score(), 0.7);
        assert_eq!(pick("A", None, Some(0.2)).score(), 0.2);
        assert_eq!(pick("A", None, None).score(), 0.0);
    }

    #[test]
    fn factor_list_envelope_decodes_scenario_payload() {
        let payload = r#"{
            "success": true,
            "factors": [{
                "factor_id": "F1",
                "factor_name": "Momentum",
                "factor_type": "technical",
                "is_active": true,
                "created_at": "2024-01-01"
            }],
            "total_count": 1
        }"#;
        let envelope: FactorListEnvelope = serde_json::from_str(payload).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.total_count, 1);
        assert_eq!(envelope.factors.len(), 1);
        let factor = &envelope.factors[0];
        assert_eq!(factor.factor_id, "F1");
        assert_eq!(factor.factor_name, "Momentum");
        assert!(factor.is_active);
    }

    #[test]
    fn scoring_envelope_tolerates_missing_optional_fields() {
        let payload = r#"{
            "success": true,
            "top_stocks": [{"ts_code": "000001.SZ", "rank": 1}],
            "selected_stocks": 1,
            "selection_method": "factor_based"
        }"#;
        let envelope: ScoringEnvelope = serde_json::from_str(payload).unwrap();
        let result = scoring_result(envelope, "x").unwrap();
        assert_eq!(result.top_stocks[0].score(), 0.0);
        assert_eq!(result.selected_stocks, 1);
    }

    #[test]
    fn scoring_failure_uses_server_error_then_fallback() {
        let envelope: ScoringEnvelope =
            serde_json::from_str(r#"{"success": false, "error": "no data"}"#).unwrap();
        assert_eq!(scoring_result(envelope, "fallback").unwrap_err(), "no data");

        let envelope: ScoringEnvelope = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert_eq!(scoring_result(envelope, "fallback").unwrap_err(), "fallback");
    }

    #[test]
    fn ranked_weights_sorts_descending_and_drops_dust() {
        let mut weights = HashMap::new();
        weights.insert("A".to_string(), 0.6);
        weights.insert("B".to_string(), 0.0005);
        weights.insert("C".to_string(), 0.39);
        let ranked = ranked_weights(&weights);
        assert_eq!(
            ranked,
            vec![("A".to_string(), 0.6), ("C".to_string(), 0.39)]
        );
    }

    #[test]
    fn ranked_weights_excludes_exact_threshold() {
        let mut weights = HashMap::new();
        weights.insert("A".to_string(), 0.001);
        assert!(ranked_weights(&weights).is_empty());
    }
}

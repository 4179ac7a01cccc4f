//! Client-side export of the last optimization result.

use std::collections::HashMap;

use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use crate::api::ranked_weights;

pub const PORTFOLIO_CSV_FILENAME: &str = "portfolio_weights.csv";

/// Build the portfolio CSV: header `Stock Code,Weight`, one row per stock
/// above the reporting threshold, weight as a percentage with two decimals.
pub fn build_portfolio_csv(weights: &HashMap<String, f64>) -> String {
    let mut csv = String::from("Stock Code,Weight\n");
    for (code, weight) in ranked_weights(weights) {
        csv.push_str(&format!("{},{:.2}%\n", code, weight * 100.0));
    }
    csv
}

/// Hand the browser a CSV download via a temporary object URL.
pub fn download_csv(filename: &str, content: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or_else(|| "No window".to_string())?;
    let document = window.document().ok_or_else(|| "No document".to_string())?;

    let parts = js_sys::Array::new();
    parts.push(&content.into());
    let options = BlobPropertyBag::new();
    options.set_type("text/csv");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)
        .map_err(|_| "Failed to build CSV blob".to_string())?;

    let url = Url::create_object_url_with_blob(&blob)
        .map_err(|_| "Failed to create download URL".to_string())?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(|_| "Failed to create download link".to_string())?
        .dyn_into()
        .map_err(|_| "Failed to create download link".to_string())?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    let _ = Url::revoke_object_url(&url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_has_header_and_percentage_rows() {
        let mut weights = HashMap::new();
        weights.insert("000001.SZ".to_string(), 0.25);
        weights.insert("600000.SH".to_string(), 0.75);
        let csv = build_portfolio_csv(&weights);
        assert_eq!(csv, "Stock Code,Weight\n600000.SH,75.00%\n000001.SZ,25.00%\n");
    }

    #[test]
    fn csv_excludes_dust_weights() {
        let mut weights = HashMap::new();
        weights.insert("A".to_string(), 0.6);
        weights.insert("B".to_string(), 0.0005);
        weights.insert("C".to_string(), 0.39);
        let csv = build_portfolio_csv(&weights);
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows, vec!["Stock Code,Weight", "A,60.00%", "C,39.00%"]);
    }

    #[test]
    fn empty_weights_still_produce_the_header() {
        let csv = build_portfolio_csv(&HashMap::new());
        assert_eq!(csv, "Stock Code,Weight\n");
    }
}

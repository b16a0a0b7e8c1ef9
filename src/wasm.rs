use wasm_bindgen::prelude::*;

/// Export a JSON job to PDF bytes.
#[wasm_bindgen]
pub fn export_pdf_json(json: &str) -> Result<Vec<u8>, JsValue> {
    crate::export_json(json)
        .map(|artifact| artifact.bytes)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// File name a host should save a job's export under.
#[wasm_bindgen]
pub fn export_file_name(json: &str) -> Result<String, JsValue> {
    let job: crate::ReportJob =
        serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let label = job
        .label()
        .ok_or_else(|| JsValue::from_str(&crate::ReportError::MissingReportType.to_string()))?;
    let today = js_sys::Date::new_0();
    let date = chrono::NaiveDate::from_ymd_opt(
        today.get_full_year() as i32,
        today.get_month() + 1,
        today.get_date(),
    )
    .ok_or_else(|| JsValue::from_str("invalid host date"))?;
    Ok(crate::file_name(label, date, crate::ExportFormat::Pdf))
}

//! Prompts for yes/no classification of extracted reports.
//!
//! Every prompt the classifier sends lives here so it can be read and tested
//! without a model. [`crate::config::ClassifyConfig::system_prompt`] and
//! [`crate::config::ClassifyConfig::question`] override the defaults.

/// System prompt sent ahead of every report.
pub const CLASSIFIER_SYSTEM_PROMPT: &str = r#"You are a document classifier for use in investigative journalism.
The journalist will provide you with a coroner's report, delimited with triple quotes (""").
You will answer a yes/no question about the contents of the report.
You must only answer YES or NO."#;

/// Question asked about each report when none is configured.
pub const DEFAULT_QUESTION: &str = r#"Does the report mention a problem with the ambulance service, such as a delay, mistake, or capacity issue? Please answer simply "YES" or "NO", in all caps, without punctuation."#;

/// Build the user message for one report.
///
/// The contents are trimmed and wrapped in triple quotes, matching the
/// delimiter announced in [`CLASSIFIER_SYSTEM_PROMPT`].
pub fn report_prompt(year: &str, contents: &str, question: &str) -> String {
    format!(
        "This is a coroner's report about a person who died in {year}:\n\n\"\"\"\n{}\n\"\"\"\n\n{question}",
        contents.trim()
    )
}

use super::xml_tree::{parse_tree, XmlElement};
use crate::constants::{ACKNOWLEDGEMENT_ROOT, MARKET_DOCUMENT_SUFFIX, NO_DATA_REASON};
use crate::errors::{AppError, AppResult};

/// A provider response body, classified by its document element.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseDocument {
    /// A market document carrying (zero or more) `TimeSeries`
    Data(XmlElement),
    /// An acknowledgement explaining why no market document was produced
    Acknowledgement(Acknowledgement),
}

/// One `Reason` block of an acknowledgement document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reason {
    pub code: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub reasons: Vec<Reason>,
}

impl Acknowledgement {
    pub fn from_element(root: &XmlElement) -> Self {
        let reasons = root
            .children
            .iter()
            .filter(|c| c.name == "Reason")
            .map(|reason| Reason {
                code: reason.text_at(&["code"]).map(str::to_string),
                text: reason.text_at(&["text"]).map(str::to_string),
            })
            .collect();
        Self { reasons }
    }

    /// `true` when the provider reports that the query matched nothing.
    pub fn is_no_data(&self) -> bool {
        self.reasons.iter().any(|r| {
            r.text
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(NO_DATA_REASON))
        })
    }

    fn reason_text(&self) -> String {
        let texts: Vec<&str> = self
            .reasons
            .iter()
            .filter_map(|r| r.text.as_deref())
            .collect();
        if texts.is_empty() {
            "Acknowledgement document without reason text".to_string()
        } else {
            texts.join("; ")
        }
    }

    /// Turns the acknowledgement into the matching failure.
    ///
    /// "No matching data" becomes `NoDataError`; anything else is a `ProviderError`
    /// carrying the first reason code and the reason text verbatim.
    pub fn into_error(self) -> AppError {
        if self.is_no_data() {
            return AppError::NoDataError(self.reason_text());
        }
        AppError::ProviderError {
            code: self.reasons.iter().find_map(|r| r.code.clone()),
            reason: self.reason_text(),
        }
    }
}

impl ResponseDocument {
    /// Classifies an already parsed tree by its root element.
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponseError` when the root is not a market document.
    pub fn classify(root: XmlElement) -> AppResult<Self> {
        if root.name == ACKNOWLEDGEMENT_ROOT {
            return Ok(Self::Acknowledgement(Acknowledgement::from_element(&root)));
        }
        if !root.name.ends_with(MARKET_DOCUMENT_SUFFIX) {
            return Err(AppError::MalformedResponseError(format!(
                "Unrecognized document root <{}>",
                root.name
            )));
        }
        Ok(Self::Data(root))
    }
}

/// Parses a response body and classifies it.
pub fn parse_document(content: &[u8]) -> AppResult<ResponseDocument> {
    ResponseDocument::classify(parse_tree(content)?)
}

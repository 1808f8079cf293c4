//! SOAP 1.1 envelope for the node agent's `handle_rtml` call.

use crate::error::RtmlResult;
use crate::rtml::Element;

pub const SOAP_ENV_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const NODE_AGENT_NAMESPACE: &str = "urn:node_agent2";
pub const SOAP_METHOD: &str = "handle_rtml";
/// Name of the single string argument of `handle_rtml`.
pub const SOAP_ARGUMENT: &str = "in0";

/// What came back inside the envelope body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoapReply {
    /// Return value of the call: an RTML document as text
    Return(String),
    Fault { code: String, reason: String },
}

/// Wrap a serialized RTML document as the argument of `handle_rtml`.
///
/// The document travels as escaped text, not as embedded XML.
pub fn build_envelope(document: &str) -> RtmlResult<String> {
    let call = Element::new(format!("na:{}", SOAP_METHOD))
        .with_child(Element::leaf(SOAP_ARGUMENT, document));

    Element::new("soapenv:Envelope")
        .with_attr("xmlns:soapenv", SOAP_ENV_NAMESPACE)
        .with_attr("xmlns:na", NODE_AGENT_NAMESPACE)
        .with_child(Element::new("soapenv:Header"))
        .with_child(Element::new("soapenv:Body").with_child(call))
        .to_xml()
}

/// Read the reply envelope.
///
/// Errors are plain messages; the caller decides how to classify them.
pub fn parse_envelope(body: &str) -> Result<SoapReply, String> {
    let envelope = Element::parse(body)?;
    if envelope.local_name() != "Envelope" {
        return Err(format!("expected SOAP Envelope, found <{}>", envelope.name()));
    }
    let body = envelope
        .child("Body")
        .ok_or_else(|| "SOAP envelope has no Body".to_string())?;

    if let Some(fault) = body.child("Fault") {
        let field = |name: &str| {
            fault
                .child(name)
                .and_then(|e| e.text())
                .map(|t| t.trim().to_string())
                .unwrap_or_default()
        };
        return Ok(SoapReply::Fault {
            code: field("faultcode"),
            reason: field("faultstring"),
        });
    }

    let response = body
        .children()
        .first()
        .ok_or_else(|| "SOAP body is empty".to_string())?;

    // The return value is the first child of the response wrapper. Some
    // servers inline the document as XML instead of escaping it.
    let value = response
        .children()
        .first()
        .ok_or_else(|| format!("<{}> carries no return value", response.name()))?;
    if let Some(text) = value.text().filter(|t| !t.trim().is_empty()) {
        return Ok(SoapReply::Return(text.trim().to_string()));
    }
    match value.children().first() {
        Some(inline) if inline.local_name() == "RTML" => inline
            .to_xml()
            .map(SoapReply::Return)
            .map_err(|e| e.to_string()),
        _ => Err(format!("<{}> return value is empty", value.name())),
    }
}

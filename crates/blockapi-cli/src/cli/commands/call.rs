//! `blockapi call <block> <operation>` – send a request and print the reply.

use std::path::Path;

use anyhow::{Context, Result};
use blockapi_core::config::BlockApiConfig;
use blockapi_core::response::{ApiResponse, ReplyKind, XmlReply};
use blockapi_core::session::{ApiCall, ApiSession, CallOutcome};
use blockapi_core::transport::CurlTransport;
use serde_json::{json, Value};

#[derive(Debug)]
pub struct CallArgs {
    pub block: String,
    pub operation: String,
    pub page: String,
    pub base_url: Option<String>,
    pub fields: Vec<(String, String)>,
    /// `(form field, local path)` pairs sent as multipart parts.
    pub files: Vec<(String, String)>,
    pub xml: bool,
    pub json: bool,
}

pub async fn run_call(mut cfg: BlockApiConfig, args: CallArgs) -> Result<()> {
    if let Some(url) = args.base_url.clone() {
        cfg.base_url = Some(url);
    }
    let reply = if args.xml { ReplyKind::Xml } else { ReplyKind::Html };
    let as_json = args.json;

    // curl is blocking; keep it off the runtime threads.
    let (url, outcome) = tokio::task::spawn_blocking(move || -> Result<(String, CallOutcome)> {
        let transport = CurlTransport::from_config(&cfg);
        let session = ApiSession::from_config(&cfg, &args.page, transport)
            .context("set base_url in the config file or pass --base-url")?;
        let url = session.endpoint(&args.block, &args.operation)?;
        let mut call = ApiCall::new(&args.block, &args.operation, reply);
        call.fields = args.fields;
        for (field, path) in &args.files {
            call = call.file(field, Path::new(path));
        }
        let outcome = session.call(call)?;
        Ok((url, outcome))
    })
    .await
    .context("request task failed")??;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&outcome_json(&url, &outcome))?);
    } else {
        print_outcome(&outcome);
    }

    if let CallOutcome::Done(ApiResponse::Failed(failure)) = outcome {
        anyhow::bail!("server reported failure: {}", failure);
    }
    Ok(())
}

fn print_outcome(outcome: &CallOutcome) {
    match outcome {
        CallOutcome::Busy => println!("(request already in flight)"),
        CallOutcome::Done(ApiResponse::Fragment(html)) => println!("{}", html),
        CallOutcome::Done(ApiResponse::Document(doc)) => print_document(doc),
        CallOutcome::Done(ApiResponse::Failed(failure)) => println!("{}", failure.error_box_html()),
    }
}

fn print_document(doc: &XmlReply) {
    for element in doc.elements() {
        let mut depth = 0;
        let mut parent = element.parent;
        while let Some(p) = parent {
            depth += 1;
            parent = doc.elements()[p].parent;
        }
        let attrs: Vec<String> = element
            .attrs
            .iter()
            .map(|(k, v)| format!("{k}={v:?}"))
            .collect();
        let mut line = format!("{:indent$}{}", "", element.name, indent = depth * 2);
        if !attrs.is_empty() {
            line.push(' ');
            line.push_str(&attrs.join(" "));
        }
        if !element.text.is_empty() {
            line.push_str(": ");
            line.push_str(&element.text);
        }
        println!("{}", line);
    }
}

fn outcome_json(url: &str, outcome: &CallOutcome) -> Value {
    match outcome {
        CallOutcome::Busy => json!({ "url": url, "status": "busy" }),
        CallOutcome::Done(ApiResponse::Fragment(html)) => {
            json!({ "url": url, "status": "ok", "html": html })
        }
        CallOutcome::Done(ApiResponse::Document(doc)) => {
            let elements: Vec<Value> = doc
                .elements()
                .iter()
                .map(|e| {
                    let attrs: serde_json::Map<String, Value> = e
                        .attrs
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                        .collect();
                    json!({ "name": e.name, "attrs": attrs, "text": e.text, "parent": e.parent })
                })
                .collect();
            json!({ "url": url, "status": "ok", "elements": elements })
        }
        CallOutcome::Done(ApiResponse::Failed(failure)) => {
            json!({ "url": url, "status": "failed", "failure": failure })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockapi_core::response::{classify_reply, ApiFailure};

    #[test]
    fn json_for_document() {
        let doc = match classify_reply(ReplyKind::Xml, r#"<rated up="set" down=""/>"#).unwrap() {
            ApiResponse::Document(doc) => doc,
            other => panic!("expected document, got {other:?}"),
        };
        let v = outcome_json("http://h/c/qaforums/api/rateup/", &CallOutcome::Done(ApiResponse::Document(doc)));
        assert_eq!(v["status"], "ok");
        assert_eq!(v["elements"][0]["name"], "rated");
        assert_eq!(v["elements"][0]["attrs"]["up"], "set");
    }

    #[test]
    fn json_for_failure() {
        let outcome = CallOutcome::Done(ApiResponse::Failed(ApiFailure::Message("nope".into())));
        let v = outcome_json("http://h/", &outcome);
        assert_eq!(v["status"], "failed");
        assert_eq!(v["failure"]["kind"], "message");
        assert_eq!(v["failure"]["detail"], "nope");
    }

    #[test]
    fn json_for_busy() {
        assert_eq!(outcome_json("http://h/", &CallOutcome::Busy)["status"], "busy");
    }
}

// ABOUTME: HTTP client for the CRM API
// ABOUTME: Handles SOAP credential login and paginated REST queries

use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashSet;
use std::time::Duration;
use url::{Position, Url};

use super::models::{EventRecord, QueryResponse};
use crate::config::CrmConfig;

const API_VERSION: &str = "59.0";

/// Authenticated CRM session. Obtained via [`CrmClient::login`] and used
/// for the lifetime of one run.
pub struct CrmClient {
    http: reqwest::Client,
    instance_url: Url,
    session_id: String,
}

impl CrmClient {
    /// Log in with username, password, and security token.
    ///
    /// The credential login endpoint is SOAP-only; the response is scanned
    /// for the session id and the instance server URL, and the session is
    /// then used as a bearer token against the REST query API.
    pub async fn login(config: &CrmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let login_url = format!(
            "{}/services/Soap/u/{}",
            config.login_url.trim_end_matches('/'),
            API_VERSION
        );
        let body = login_envelope(&config.username, &config.password, &config.security_token);

        let response = http
            .post(&login_url)
            .header("Content-Type", "text/xml; charset=UTF-8")
            .header("SOAPAction", "login")
            .body(body)
            .send()
            .await
            .context("CRM login request failed")?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context("Failed to read CRM login response")?;

        if !status.is_success() {
            // Login faults come back as SOAP faults with a readable message
            if let Some(fault) = extract_tag(&text, "faultstring") {
                bail!("CRM authentication failed: {}", fault);
            }
            bail!("CRM login failed with status {}: {}", status, text);
        }

        let session_id = extract_tag(&text, "sessionId")
            .ok_or_else(|| anyhow!("CRM login response is missing a session id"))?
            .to_string();
        let server_url = extract_tag(&text, "serverUrl")
            .ok_or_else(|| anyhow!("CRM login response is missing a server URL"))?;
        let server_url =
            Url::parse(server_url).context("CRM login returned an invalid server URL")?;
        let instance_url = Url::parse(&server_url[..Position::BeforePath])
            .context("Failed to derive CRM instance URL from server URL")?;

        tracing::debug!("CRM login succeeded, instance: {}", instance_url);

        Ok(Self {
            http,
            instance_url,
            session_id,
        })
    }

    /// Run a query and return all matching records across every page.
    ///
    /// Partial result sets are a correctness bug, so pagination is followed
    /// until the server reports `done`; a missing or repeating cursor
    /// aborts the run instead of returning a truncated table.
    pub async fn query_all(&self, soql: &str) -> Result<Vec<EventRecord>> {
        let mut page_url = self
            .instance_url
            .join(&format!("services/data/v{}/query", API_VERSION))
            .context("Failed to build query URL")?;
        page_url.query_pairs_mut().append_pair("q", soql);

        let mut records = Vec::new();
        let mut visited: HashSet<Url> = HashSet::new();
        let mut expected_total = None;

        loop {
            let page = self.fetch_page(page_url.clone()).await?;
            expected_total.get_or_insert(page.total_size);
            records.extend(page.records);

            if page.done {
                break;
            }

            let cursor = page.next_records_url.ok_or_else(|| {
                anyhow!("CRM reported more records but returned no pagination cursor")
            })?;
            let next_url = self
                .instance_url
                .join(&cursor)
                .context("CRM returned an invalid pagination cursor")?;
            if !visited.insert(next_url.clone()) {
                bail!("CRM pagination cursor repeated; aborting rather than returning a partial result set");
            }
            page_url = next_url;
        }

        if let Some(total) = expected_total {
            if total >= 0 && records.len() as i64 != total {
                tracing::warn!(
                    "CRM reported {} total records but {} were fetched",
                    total,
                    records.len()
                );
            }
        }

        Ok(records)
    }

    async fn fetch_page(&self, url: Url) -> Result<QueryResponse> {
        let response = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {}", self.session_id))
            .send()
            .await
            .context("CRM query request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status == 401 {
                bail!(
                    "CRM rejected the session (status 401). The session may have expired: {}",
                    body
                );
            }

            bail!("CRM query failed with status {}: {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse CRM query response")
    }
}

/// Build the SOAP login envelope for the credential login endpoint.
fn login_envelope(username: &str, password: &str, security_token: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\" \
         xmlns:urn=\"urn:partner.soap.sforce.com\">\
         <soapenv:Body><urn:login>\
         <urn:username>{}</urn:username>\
         <urn:password>{}{}</urn:password>\
         </urn:login></soapenv:Body></soapenv:Envelope>",
        xml_escape(username),
        xml_escape(password),
        xml_escape(security_token)
    )
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Extract the text content of the first occurrence of a simple XML tag.
/// Sufficient for the flat login response; not a general XML parser.
fn extract_tag<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = xml.find(&open)? + open.len();
    let end = xml[start..].find(&close)? + start;
    Some(&xml[start..end])
}

//! Decoding of `openstack ... -f json` listings
//!
//! The CLI may print warnings ahead of the JSON document, and individual rows
//! can be malformed (error rows, half-built resources). Rows that do not
//! decode are skipped and counted, never fatal.

use crate::error::{OpenStackError, Result};
use envsweep_cloud::split_list;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Decoded rows of a listing
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub rows: Vec<T>,

    /// Number of rows that were dropped as malformed
    pub skipped: usize,
}

impl<T> Listing<T> {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            skipped: 0,
        }
    }
}

/// A row that can reject itself after decoding (e.g. empty ID)
pub trait Row {
    fn is_valid(&self) -> bool;
}

/// Strip any lines printed before the JSON document
fn json_body(raw: &str) -> &str {
    let mut offset = 0;
    for line in raw.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            return raw[offset..].trim();
        }
        offset += line.len();
    }
    ""
}

/// Decode a JSON array listing, skipping rows that fail to decode
pub fn decode_rows<T>(raw: &str) -> Result<Listing<T>>
where
    T: DeserializeOwned + Row,
{
    let body = json_body(raw);
    if body.is_empty() || body == "[]" {
        return Ok(Listing::empty());
    }

    let values: Vec<Value> = match serde_json::from_str(body)? {
        Value::Array(values) => values,
        other => {
            return Err(OpenStackError::UnexpectedOutput(format!(
                "expected a JSON array, got: {}",
                other
            )));
        }
    };

    let mut listing = Listing::empty();
    for value in values {
        match serde_json::from_value::<T>(value.clone()) {
            Ok(row) if row.is_valid() => listing.rows.push(row),
            Ok(_) => {
                tracing::debug!("Skipping invalid row: {}", value);
                listing.skipped += 1;
            }
            Err(e) => {
                tracing::debug!("Skipping malformed row ({}): {}", e, value);
                listing.skipped += 1;
            }
        }
    }

    Ok(listing)
}

/// Decode a single JSON object (e.g. `server show -f json`)
pub fn decode_object<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let body = json_body(raw);
    if body.is_empty() {
        return Err(OpenStackError::UnexpectedOutput(
            "empty output where an object was expected".to_string(),
        ));
    }
    Ok(serde_json::from_str(body)?)
}

/// Addresses of one network, in listing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkAddresses {
    pub network: String,
    pub addresses: Vec<String>,
}

/// Parse the `Networks`/`addresses` field of a server.
///
/// Newer clients emit `{"net": ["10.0.0.5", "172.24.4.10"]}`, older ones
/// emit `"net=10.0.0.5, 172.24.4.10; other=192.168.0.3"`.
pub fn parse_networks(value: &Value) -> Vec<NetworkAddresses> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(network, addrs)| NetworkAddresses {
                network: network.clone(),
                addresses: match addrs {
                    Value::Array(items) => items
                        .iter()
                        .filter_map(|item| match item {
                            Value::String(s) => Some(s.trim().to_string()),
                            Value::Object(obj) => obj
                                .get("addr")
                                .and_then(Value::as_str)
                                .map(|s| s.trim().to_string()),
                            _ => None,
                        })
                        .filter(|s| !s.is_empty())
                        .collect(),
                    Value::String(s) => split_list(s, ','),
                    _ => Vec::new(),
                },
            })
            .filter(|n| !n.addresses.is_empty())
            .collect(),
        Value::String(s) => split_list(s, ';')
            .into_iter()
            .filter_map(|segment| {
                let (network, addrs) = segment.split_once('=')?;
                let addresses = split_list(addrs, ',');
                if addresses.is_empty() {
                    return None;
                }
                Some(NetworkAddresses {
                    network: network.trim().to_string(),
                    addresses,
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn is_routable_v4(v4: Ipv4Addr) -> bool {
    let [a, b, ..] = v4.octets();
    // 100.64.0.0/10 is carrier-grade NAT space
    let shared = a == 100 && (b & 0xc0) == 64;
    !(v4.is_private()
        || v4.is_loopback()
        || v4.is_link_local()
        || v4.is_unspecified()
        || v4.is_documentation()
        || shared)
}

fn is_routable_v6(v6: Ipv6Addr) -> bool {
    let [first, second, ..] = v6.segments();
    // 2001:db8::/32
    let documentation = first == 0x2001 && second == 0x0db8;
    !(v6.is_loopback()
        || v6.is_unspecified()
        || v6.is_unique_local()
        || v6.is_unicast_link_local()
        || documentation)
}

/// Pick the public address of a server.
///
/// A globally routable IPv4 address wins over IPv6, since guests are reached
/// through their floating IPv4. Otherwise the last address of a network
/// carrying more than one address is taken, since the client lists the fixed
/// address before the floating one.
pub fn public_address(networks: &[NetworkAddresses]) -> Option<String> {
    let addresses = || networks.iter().flat_map(|n| n.addresses.iter());

    addresses()
        .find(|a| matches!(a.parse::<IpAddr>(), Ok(IpAddr::V4(v4)) if is_routable_v4(v4)))
        .or_else(|| {
            addresses()
                .find(|a| matches!(a.parse::<IpAddr>(), Ok(IpAddr::V6(v6)) if is_routable_v6(v6)))
        })
        .or_else(|| {
            networks
                .iter()
                .filter(|n| n.addresses.len() > 1)
                .find_map(|n| n.addresses.last())
        })
        .cloned()
}

/// Parse the `Attached to`/`attachments` field of a volume into server IDs.
///
/// JSON output lists attachment objects carrying `server_id`; older clients
/// print `Attached to <server> on /dev/vdb`.
pub fn parse_attachments(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                item.get("server_id")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .collect(),
        Value::String(s) => split_list(s, '\n')
            .into_iter()
            .filter_map(|line| {
                let rest = line.strip_prefix("Attached to ")?;
                let server = rest.split(" on ").next()?.trim();
                (!server.is_empty()).then(|| server.to_string())
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse an image reference (`"cirros (uuid)"`, `{"id": ...}` or `""`)
pub fn parse_image(value: &Value) -> Option<String> {
    let image = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Object(obj) => obj
            .get("name")
            .or_else(|| obj.get("id"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string(),
        _ => String::new(),
    };
    (!image.is_empty()).then_some(image)
}

use crate::session::DEFAULT_SESSION_CAPACITY;
use std::{env, net::IpAddr};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED);

pub fn resolve_port() -> u16 {
    parse_port(env::var("PORT").ok().as_deref())
}

pub fn resolve_bind_addr() -> IpAddr {
    parse_bind_addr(env::var("BIND_ADDR").ok().as_deref())
}

pub fn resolve_session_capacity() -> usize {
    parse_session_capacity(env::var("SESSION_CAPACITY").ok().as_deref())
}

fn parse_port(value: Option<&str>) -> u16 {
    match value.map(str::trim) {
        None | Some("") => DEFAULT_PORT,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("ignoring invalid PORT '{raw}', using {DEFAULT_PORT}");
            DEFAULT_PORT
        }),
    }
}

fn parse_bind_addr(value: Option<&str>) -> IpAddr {
    match value.map(str::trim) {
        None | Some("") => DEFAULT_BIND_ADDR,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("ignoring invalid BIND_ADDR '{raw}', using {DEFAULT_BIND_ADDR}");
            DEFAULT_BIND_ADDR
        }),
    }
}

fn parse_session_capacity(value: Option<&str>) -> usize {
    match value.map(str::trim) {
        None | Some("") => DEFAULT_SESSION_CAPACITY,
        Some(raw) => match raw.parse::<usize>() {
            Ok(capacity) if capacity > 0 => capacity,
            _ => {
                warn!("ignoring invalid SESSION_CAPACITY '{raw}', using {DEFAULT_SESSION_CAPACITY}");
                DEFAULT_SESSION_CAPACITY
            }
        },
    }
}

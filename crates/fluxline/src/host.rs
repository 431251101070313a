// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Best-effort host name for the implicit `host` tag.
//!
//! Resolution chain:
//! 1. system hostname
//! 2. forward lookup of that hostname
//! 3. reverse lookup of the first IPv4 address found
//!
//! Any failure after step 1 falls back to the short hostname. Nothing is
//! cached; each call resolves again.

use log::debug;
use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};

/// Fully qualified domain name of this machine, or the short hostname.
///
/// Returns an empty string only if the system hostname itself is unavailable.
pub fn fqdn() -> String {
    let Some(hostname) = hostname() else {
        debug!("system hostname unavailable");
        return String::new();
    };

    match lookup_fqdn(&hostname) {
        Some(fqdn) => fqdn,
        None => {
            debug!("FQDN lookup failed, using short hostname '{}'", hostname);
            hostname
        }
    }
}

fn lookup_fqdn(hostname: &str) -> Option<String> {
    let addrs = match (hostname, 0).to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            debug!("forward lookup of '{}' failed: {}", hostname, e);
            return None;
        }
    };

    let ipv4 = addrs
        .map(|a| a.ip())
        .find_map(|ip| match ip {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })?;

    let name = reverse_lookup(ipv4)?;
    if name.is_empty() {
        return None;
    }
    Some(strip_root_dot(&name).to_string())
}

/// Drop the trailing root label dot (`host.example.com.`).
fn strip_root_dot(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Get system hostname (Unix/Linux).
#[cfg(unix)]
pub fn hostname() -> Option<String> {
    let mut buf = [0u8; 256];
    // SAFETY:
    // - buf is a valid mutable buffer with known size (256 bytes)
    // - gethostname writes at most buf.len() bytes including NUL terminator
    let ret = unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
    if ret != 0 {
        return None;
    }

    // Truncated names may lack the terminator, so bound the search
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    let hostname = String::from_utf8_lossy(&buf[..len]).into_owned();

    if hostname.is_empty() {
        None
    } else {
        Some(hostname)
    }
}

/// Get system hostname (Windows).
#[cfg(windows)]
pub fn hostname() -> Option<String> {
    std::env::var("COMPUTERNAME").ok().filter(|h| !h.is_empty())
}

#[cfg(unix)]
fn reverse_lookup(addr: Ipv4Addr) -> Option<String> {
    const MAX_HOST: usize = 1025;

    // SAFETY: sockaddr_in is plain old data; all-zero is a valid value
    let mut sin: libc::sockaddr_in = unsafe { std::mem::zeroed() };
    sin.sin_family = libc::AF_INET as libc::sa_family_t;
    sin.sin_addr = libc::in_addr {
        s_addr: u32::from_ne_bytes(addr.octets()),
    };

    let mut host = [0 as libc::c_char; MAX_HOST];
    // SAFETY:
    // - sin is a fully initialized sockaddr_in and salen matches its size
    // - host is a writable buffer of MAX_HOST bytes, hostlen matches
    // - serv is null with servlen 0, which getnameinfo accepts
    let ret = unsafe {
        libc::getnameinfo(
            &sin as *const libc::sockaddr_in as *const libc::sockaddr,
            std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
            host.as_mut_ptr(),
            MAX_HOST as libc::socklen_t,
            std::ptr::null_mut(),
            0,
            libc::NI_NAMEREQD,
        )
    };
    if ret != 0 {
        debug!("reverse lookup of {} failed (code {})", addr, ret);
        return None;
    }

    // SAFETY:
    // - getnameinfo succeeded, so host holds a NUL-terminated string
    // - we copy into an owned String before host goes out of scope
    let name = unsafe { std::ffi::CStr::from_ptr(host.as_ptr()) }
        .to_string_lossy()
        .into_owned();
    Some(name)
}

#[cfg(windows)]
fn reverse_lookup(_addr: Ipv4Addr) -> Option<String> {
    None
}

//! Correlation tokens: `(<timestamp>):<user>@<fqdn>-><target>`.

use std::{env, sync::OnceLock};

use bcctl_model::TrackingId;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

const USER_ENV_VARS: [&str; 4] = ["LOGNAME", "USER", "LNAME", "USERNAME"];
const UNKNOWN: &str = "unknown";

static USER_NAME: OnceLock<String> = OnceLock::new();
static FQDN: OnceLock<String> = OnceLock::new();

type Clock = Box<dyn Fn() -> String + Send + Sync>;

/// Builds tracking ids.
///
/// Defaults to the wall clock and the identity of the invoking process; both can be
/// replaced so that ids become deterministic.
pub struct TrackingIdGenerator {
    clock: Clock,
    identity: Option<(String, String)>,
}

impl Default for TrackingIdGenerator {
    fn default() -> Self {
        Self {
            clock: Box::new(wall_clock),
            identity: None,
        }
    }
}

impl TrackingIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_identity(mut self, user: impl Into<String>, host: impl Into<String>) -> Self {
        self.identity = Some((user.into(), host.into()));
        self
    }

    pub fn generate(&self, target: &str) -> TrackingId {
        let timestamp = (self.clock)();
        let (user, host) = match &self.identity {
            Some((user, host)) => (user.as_str(), host.as_str()),
            None => (user_name(), fqdn()),
        };
        TrackingId::new(format!("({timestamp}):{user}@{host}->{target}"))
    }
}

fn wall_clock() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

/// Name of the invoking user.
///
/// Login environment variables win over the password database.
pub fn user_name() -> &'static str {
    USER_NAME.get_or_init(|| {
        USER_ENV_VARS
            .iter()
            .filter_map(|var| env::var(var).ok())
            .find(|v| !v.is_empty())
            .or_else(sys::passwd_name)
            .unwrap_or_else(|| UNKNOWN.to_string())
    })
}

/// Fully qualified name of this machine, or its plain hostname if it cannot be resolved.
pub fn fqdn() -> &'static str {
    FQDN.get_or_init(|| {
        let host = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .filter(|h| !h.is_empty());

        match host {
            Some(host) => sys::canonical_name(&host).unwrap_or(host),
            None => UNKNOWN.to_string(),
        }
    })
}

#[cfg(unix)]
mod sys {
    use std::{
        ffi::{CStr, CString},
        mem, ptr,
    };

    const PASSWD_BUF_LEN: usize = 4096;

    pub(super) fn passwd_name() -> Option<String> {
        let mut pwd: libc::passwd = unsafe { mem::zeroed() };
        let mut result: *mut libc::passwd = ptr::null_mut();
        let mut buf = vec![0 as libc::c_char; PASSWD_BUF_LEN];

        let rc = unsafe {
            libc::getpwuid_r(
                libc::geteuid(),
                &mut pwd,
                buf.as_mut_ptr(),
                buf.len(),
                &mut result,
            )
        };
        if rc != 0 || result.is_null() || pwd.pw_name.is_null() {
            return None;
        }

        let name = unsafe { CStr::from_ptr(pwd.pw_name) };
        name.to_str().ok().filter(|n| !n.is_empty()).map(str::to_owned)
    }

    pub(super) fn canonical_name(host: &str) -> Option<String> {
        let c_host = CString::new(host).ok()?;
        let mut hints: libc::addrinfo = unsafe { mem::zeroed() };
        hints.ai_family = libc::AF_UNSPEC;
        hints.ai_flags = libc::AI_CANONNAME;

        let mut res: *mut libc::addrinfo = ptr::null_mut();
        let rc = unsafe { libc::getaddrinfo(c_host.as_ptr(), ptr::null(), &hints, &mut res) };
        if rc != 0 || res.is_null() {
            return None;
        }

        let name = unsafe {
            let canon = (*res).ai_canonname;
            if canon.is_null() {
                None
            } else {
                CStr::from_ptr(canon).to_str().ok().map(str::to_owned)
            }
        };
        unsafe { libc::freeaddrinfo(res) };

        name.filter(|n| !n.is_empty())
    }
}

#[cfg(not(unix))]
mod sys {
    pub(super) fn passwd_name() -> Option<String> {
        None
    }

    pub(super) fn canonical_name(_host: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_with_fixed_inputs() {
        let tg = TrackingIdGenerator::new()
            .with_clock(|| "2024-01-02T03:04:05Z".into())
            .with_identity("alice", "build.example.org");

        let a = tg.generate("web01");
        let b = tg.generate("web01");

        assert_eq!(a, b);
        assert_eq!(
            a.as_str(),
            "(2024-01-02T03:04:05Z):alice@build.example.org->web01"
        );
        assert_eq!(
            a.as_argument(),
            "--tracking-id=(2024-01-02T03:04:05Z):alice@build.example.org->web01"
        );
    }

    #[test]
    fn target_distinguishes_ids() {
        let tg = TrackingIdGenerator::new()
            .with_clock(|| "t".into())
            .with_identity("u", "h");
        assert_ne!(tg.generate("a"), tg.generate("b"));
    }

    #[test]
    fn process_identity_is_never_empty() {
        assert!(!user_name().is_empty());
        assert!(!fqdn().is_empty());

        let id = TrackingIdGenerator::new()
            .with_clock(|| "t".into())
            .generate("web01");
        assert!(id.as_str().starts_with("(t):"));
        assert!(id.as_str().ends_with("->web01"));
    }

    #[test]
    fn wall_clock_is_rfc3339() {
        let ts = wall_clock();
        assert!(OffsetDateTime::parse(&ts, &Rfc3339).is_ok(), "{ts}");
    }
}

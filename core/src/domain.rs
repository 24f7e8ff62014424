use url::Url;

/// The short-link host.
pub const SHORTENER_HOST: &str = "lnkd.in";
/// The parent platform, which serves the interstitial pages.
pub const PLATFORM_HOST: &str = "linkedin.com";

pub fn default_interstitial_hosts() -> Vec<String> {
    vec![SHORTENER_HOST.to_string(), PLATFORM_HOST.to_string()]
}

/// Whether a landed URL is still on one of the given hosts (or a subdomain of
/// one), meaning the redirect chain stopped on an interstitial page.
pub fn is_interstitial<S: AsRef<str>>(url: &Url, hosts: &[S]) -> bool {
    url.host_str()
        .map(|host| host.trim_end_matches('.').to_ascii_lowercase())
        .map(|host| {
            hosts.iter().any(|candidate| {
                let candidate = candidate.as_ref();

                host.eq_ignore_ascii_case(candidate)
                    || host
                        .strip_suffix(&candidate.to_ascii_lowercase())
                        .map(|prefix| prefix.ends_with('.'))
                        .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

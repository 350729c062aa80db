pub(crate) mod transient_cookies;

pub(crate) use transient_cookies::TransientCookies;

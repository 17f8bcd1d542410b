// Copyright 2025 the Underpass Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host history collaborator.
//!
//! The navigator tree never touches a browser or platform history directly.
//! It reads and writes URLs through [`HostHistory`] and receives the host's
//! gestures as [`HistoryAction`]s, which keeps the tree testable and the
//! platform glue thin.

use alloc::string::{String, ToString};

/// A URL split into the three parts the navigator cares about.
///
/// `path` has no leading slash, `search` no leading `?`, `hash` no leading
/// `#`. Scheme and authority are the host's business.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlParts {
    /// Slash-separated path.
    pub path: String,
    /// Query string.
    pub search: String,
    /// Fragment.
    pub hash: String,
}

impl UrlParts {
    /// Split an href of the form `/path?search#hash`.
    ///
    /// All three parts are optional; leading `/`, `?` and `#` are stripped.
    pub fn parse(href: &str) -> Self {
        let (rest, hash) = match href.split_once('#') {
            Some((rest, hash)) => (rest, hash),
            None => (href, ""),
        };
        let (path, search) = match rest.split_once('?') {
            Some((path, search)) => (path, search),
            None => (rest, ""),
        };
        Self {
            path: path.trim_start_matches('/').to_string(),
            search: search.to_string(),
            hash: hash.to_string(),
        }
    }

    /// Rebuild the `/path?search#hash` form.
    pub fn to_href(&self) -> String {
        let mut href = String::from("/");
        href.push_str(self.path.trim_start_matches('/'));
        if !self.search.is_empty() {
            href.push('?');
            href.push_str(&self.search);
        }
        if !self.hash.is_empty() {
            href.push('#');
            href.push_str(&self.hash);
        }
        href
    }
}

/// A host gesture the navigator tree should handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryAction {
    /// The host's back gesture (hardware button, browser chrome).
    Back,
    /// The host's forward gesture.
    Forward,
    /// The URL fragment changed without navigation.
    HashChange(String),
}

/// What the navigator tree needs from the platform's history.
pub trait HostHistory {
    /// The current URL.
    fn url(&self) -> UrlParts;

    /// Replace the current URL. Called when navigation changes where the
    /// tree points; must not re-enter the tree.
    fn set_url(&mut self, url: &UrlParts);

    /// The root stack was popped past its last route; leave the app.
    fn exit(&mut self);

    /// Make the host's forward gesture available, on platforms that hide
    /// it by default.
    fn enable_forward_button(&mut self);
}

#[cfg(test)]
pub(crate) mod testing {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use super::{HostHistory, UrlParts};

    /// Shared state of a [`RecordingHost`], inspectable from tests after the
    /// host has been moved into a tree.
    #[derive(Debug, Default)]
    pub(crate) struct HostState {
        pub(crate) current: UrlParts,
        pub(crate) set_urls: Vec<UrlParts>,
        pub(crate) exited: bool,
        pub(crate) forward_enabled: bool,
    }

    #[derive(Clone, Debug, Default)]
    pub(crate) struct RecordingHost(pub(crate) Rc<RefCell<HostState>>);

    impl RecordingHost {
        pub(crate) fn at(href: &str) -> Self {
            let host = Self::default();
            host.0.borrow_mut().current = UrlParts::parse(href);
            host
        }

        pub(crate) fn last_href(&self) -> Option<alloc::string::String> {
            self.0.borrow().set_urls.last().map(UrlParts::to_href)
        }
    }

    impl HostHistory for RecordingHost {
        fn url(&self) -> UrlParts {
            self.0.borrow().current.clone()
        }

        fn set_url(&mut self, url: &UrlParts) {
            let mut state = self.0.borrow_mut();
            state.current = url.clone();
            state.set_urls.push(url.clone());
        }

        fn exit(&mut self) {
            self.0.borrow_mut().exited = true;
        }

        fn enable_forward_button(&mut self) {
            self.0.borrow_mut().forward_enabled = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_all_parts() {
        let url = UrlParts::parse("/user/42?tab=posts#top");
        assert_eq!(url.path, "user/42");
        assert_eq!(url.search, "tab=posts");
        assert_eq!(url.hash, "top");
    }

    #[test]
    fn parse_handles_missing_parts() {
        assert_eq!(UrlParts::parse("/"), UrlParts::default());
        assert_eq!(UrlParts::parse("").path, "");

        let url = UrlParts::parse("app#frag");
        assert_eq!(url.path, "app");
        assert_eq!(url.search, "");
        assert_eq!(url.hash, "frag");
    }

    #[test]
    fn href_round_trips() {
        for href in ["/", "/user/42", "/user/42?a=1", "/a?b=2#c"] {
            assert_eq!(UrlParts::parse(href).to_href(), href);
        }
    }

    #[test]
    fn to_href_always_leads_with_slash() {
        let url = UrlParts {
            path: "app".into(),
            search: String::new(),
            hash: String::new(),
        };
        assert_eq!(url.to_href(), "/app");
    }
}

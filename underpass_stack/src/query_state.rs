// Copyright 2025 the Underpass Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed bindings from state values to query parameters.
//!
//! A [`QueryBinding`] keeps one piece of UI state (a tab, a filter, a page
//! number) in the current location's query string, so it survives reloads
//! and participates in history. Reading goes through [`QueryBinding::get`];
//! writing rewrites the current location's query via the navigator, either
//! as a new history entry or in place ([`WriteMode`]).

use alloc::string::String;
use core::fmt::{Debug, Formatter, Result as FmtResult};

use underpass_location::Location;

use crate::navigator::{NavError, NavTree, NavigatorId, UpdateOptions};
use crate::route::RouteEntry;

/// How writing a bound value affects the route's history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Push a new location, so back restores the previous value.
    #[default]
    Push,
    /// Replace the current location in place.
    Replace,
}

/// A typed binding to one query parameter.
pub struct QueryBinding<T> {
    key: String,
    mode: WriteMode,
    parse: fn(&str) -> Option<T>,
    stringify: fn(&T) -> String,
    default: Option<T>,
}

impl<T: Clone> QueryBinding<T> {
    /// Bind `key` with a parse/stringify pair.
    pub fn new(key: impl Into<String>, parse: fn(&str) -> Option<T>, stringify: fn(&T) -> String) -> Self {
        Self {
            key: key.into(),
            mode: WriteMode::default(),
            parse,
            stringify,
            default: None,
        }
    }

    /// Set the write mode.
    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Value to report when the parameter is absent or unparseable.
    pub fn with_default(mut self, value: T) -> Self {
        self.default = Some(value);
        self
    }

    /// The bound query key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the bound value from a location.
    pub fn get(&self, location: &Location) -> Option<T> {
        location
            .query_get(&self.key)
            .and_then(|raw| (self.parse)(&raw))
            .or_else(|| self.default.clone())
    }

    /// Write the bound value into the navigator's current location.
    ///
    /// `None` removes the parameter. Other query parameters are preserved.
    /// Returns whether the route accepted the update.
    pub fn set<P>(
        &self,
        tree: &mut NavTree<P>,
        id: NavigatorId,
        value: Option<&T>,
    ) -> Result<bool, NavError> {
        let pairs = {
            let location = tree
                .current(id)
                .and_then(RouteEntry::location)
                .ok_or(NavError::NotInitialized)?;
            let mut pairs = location.query();
            pairs.retain(|(key, _)| key != &self.key);
            if let Some(value) = value {
                pairs.push((self.key.clone(), (self.stringify)(value)));
            }
            pairs
        };
        let options = UpdateOptions {
            query: Some(pairs),
            ..UpdateOptions::default()
        };
        match self.mode {
            WriteMode::Push => tree.push_update(id, options),
            WriteMode::Replace => tree.update_current(id, options),
        }
    }
}

impl<T> Debug for QueryBinding<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("QueryBinding")
            .field("key", &self.key)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::RecordingHost;
    use crate::navigator::{NavigatorOptions, RouteOutcome, RouteTable};
    use alloc::boxed::Box;
    use alloc::string::ToString;

    fn page_binding() -> QueryBinding<u32> {
        QueryBinding::new("page", |raw| raw.parse().ok(), |value| value.to_string())
    }

    fn rooted(href: &str) -> (NavTree<&'static str>, crate::navigator::NavigatorId, RecordingHost) {
        let host = RecordingHost::at(href);
        let mut table = RouteTable::new();
        table.insert("list", || RouteOutcome::Page("list"));
        let mut tree = NavTree::new();
        let root = tree.insert_root(
            table,
            NavigatorOptions::default(),
            Some(Box::new(host.clone())),
        );
        tree.initialize(root, 0).unwrap();
        (tree, root, host)
    }

    #[test]
    fn get_parses_and_falls_back_to_the_default() {
        let binding = page_binding().with_default(1);
        let (tree, root, _host) = rooted("/list?page=3");
        let location = tree.current(root).unwrap().location().unwrap();
        assert_eq!(binding.get(location), Some(3));

        let (tree, root, _host) = rooted("/list");
        let location = tree.current(root).unwrap().location().unwrap();
        assert_eq!(binding.get(location), Some(1));

        let (tree, root, _host) = rooted("/list?page=junk");
        let location = tree.current(root).unwrap().location().unwrap();
        assert_eq!(binding.get(location), Some(1));
    }

    #[test]
    fn set_pushes_a_history_entry_by_default() {
        let binding = page_binding();
        let (mut tree, root, host) = rooted("/list?sort=name");
        assert!(binding.set(&mut tree, root, Some(&2)).unwrap());

        assert_eq!(host.last_href().unwrap(), "/list?sort=name&page=2");
        assert_eq!(tree.current(root).unwrap().history().len(), 2);

        // Back restores the previous value.
        tree.back(root, 10).unwrap();
        let location = tree.current(root).unwrap().location().unwrap();
        assert_eq!(binding.get(location), None);
        assert_eq!(location.query_get("sort").as_deref(), Some("name"));
    }

    #[test]
    fn replace_mode_rewrites_in_place() {
        let binding = page_binding().with_mode(WriteMode::Replace);
        let (mut tree, root, host) = rooted("/list?page=1");
        assert!(binding.set(&mut tree, root, Some(&2)).unwrap());
        assert_eq!(tree.current(root).unwrap().history().len(), 1);
        assert_eq!(host.last_href().unwrap(), "/list?page=2");
    }

    #[test]
    fn setting_none_removes_the_parameter() {
        let binding = page_binding().with_mode(WriteMode::Replace);
        let (mut tree, root, host) = rooted("/list?page=4&sort=name");
        assert!(binding.set(&mut tree, root, None).unwrap());
        assert_eq!(host.last_href().unwrap(), "/list?sort=name");
    }
}

// This file is part of the syzygy-platform library.
// Copyright (C) 2017-2025 Niklas Fiekas <niklas.fiekas@backscattering.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

use std::{
    convert::Infallible,
    env, fmt,
    path::{Path, PathBuf},
    slice,
    str::FromStr,
};

use crate::sys::{Native, Platform};

/// Separates directories in a search path string: `:` on Unix, `;` on
/// Windows.
pub const SEPARATOR: char = <Native as Platform>::SEPARATOR;

/// Environment variable read by [`SearchPath::from_default_env()`].
pub const ENV_VAR: &str = "SYZYGY_PATH";

/// Directories to search for table files, in order of priority.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// An empty search path. Nothing will be found.
    pub fn new() -> SearchPath {
        SearchPath::default()
    }

    /// Splits `s` at [`SEPARATOR`]. Empty segments are ignored.
    pub fn parse(s: &str) -> SearchPath {
        SearchPath::parse_with(s, SEPARATOR)
    }

    /// Splits `s` at a given separator. Empty segments are ignored.
    pub fn parse_with(s: &str, separator: char) -> SearchPath {
        SearchPath {
            dirs: s
                .split(separator)
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from)
                .collect(),
        }
    }

    /// Reads a search path string from an environment variable.
    ///
    /// Returns `None` if the variable is not set or not valid unicode.
    pub fn from_env(var: &str) -> Option<SearchPath> {
        env::var(var).ok().map(|s| SearchPath::parse(&s))
    }

    /// Reads the search path from [`ENV_VAR`].
    pub fn from_default_env() -> Option<SearchPath> {
        SearchPath::from_env(ENV_VAR)
    }

    /// Appends a directory with the lowest priority so far. Empty paths are
    /// ignored.
    pub fn push<P: Into<PathBuf>>(&mut self, dir: P) {
        let dir = dir.into();
        if !dir.as_os_str().is_empty() {
            self.dirs.push(dir);
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

impl FromStr for SearchPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<SearchPath, Infallible> {
        Ok(SearchPath::parse(s))
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for SearchPath {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> SearchPath {
        let mut search_path = SearchPath::new();
        for dir in iter {
            search_path.push(dir);
        }
        search_path
    }
}

impl<'a> IntoIterator for &'a SearchPath {
    type Item = &'a PathBuf;
    type IntoIter = slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.dirs.iter()
    }
}

impl fmt::Display for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, dir) in self.dirs.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            write!(f, "{}", dir.display())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let s = format!("{SEPARATOR}tables/wdl{SEPARATOR}{SEPARATOR}tables/dtz{SEPARATOR}");
        let search_path = SearchPath::parse(&s);
        assert_eq!(
            search_path.dirs(),
            [PathBuf::from("tables/wdl"), PathBuf::from("tables/dtz")]
        );
        assert_eq!(
            search_path.to_string(),
            format!("tables/wdl{SEPARATOR}tables/dtz")
        );
    }

    #[test]
    fn test_parse_with() {
        let search_path = SearchPath::parse_with("a;b;;c", ';');
        assert_eq!(search_path.len(), 3);
        assert_eq!(
            search_path.iter().collect::<Vec<_>>(),
            [Path::new("a"), Path::new("b"), Path::new("c")]
        );
    }

    #[test]
    fn test_empty() {
        assert!(SearchPath::parse("").is_empty());
        assert!(SearchPath::parse(&SEPARATOR.to_string()).is_empty());
        assert_eq!(SearchPath::new().to_string(), "");
    }

    #[test]
    fn test_from_iter() {
        let search_path: SearchPath = ["a", "", "b"].into_iter().collect();
        assert_eq!(search_path, SearchPath::parse(&format!("a{SEPARATOR}b")));
    }

    #[test]
    fn test_from_env() {
        assert_eq!(SearchPath::from_env("SYZYGY_PLATFORM_UNSET_SEARCH_PATH"), None);

        // Set by cargo for test processes. Only read, never modified.
        let var = "CARGO_MANIFEST_DIR";
        assert_eq!(
            SearchPath::from_env(var),
            env::var(var).ok().map(|s| SearchPath::parse(&s))
        );
    }
}

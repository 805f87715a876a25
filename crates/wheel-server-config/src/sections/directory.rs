// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User directory settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryConfig {
	/// JSON seed file for the in-memory directory. `None` starts it empty.
	pub seed_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfigLayer {
	#[serde(default)]
	pub seed_path: Option<String>,
}

impl DirectoryConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.seed_path.is_some() {
			self.seed_path = other.seed_path;
		}
	}

	pub fn finalize(self) -> DirectoryConfig {
		DirectoryConfig {
			seed_path: self.seed_path.map(PathBuf::from),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_has_no_seed() {
		assert!(DirectoryConfigLayer::default().finalize().seed_path.is_none());
	}

	#[test]
	fn test_merge_overwrites() {
		let mut base = DirectoryConfigLayer {
			seed_path: Some("/old.json".to_string()),
		};
		base.merge(DirectoryConfigLayer {
			seed_path: Some("/new.json".to_string()),
		});
		assert_eq!(
			base.finalize().seed_path,
			Some(PathBuf::from("/new.json"))
		);
	}
}

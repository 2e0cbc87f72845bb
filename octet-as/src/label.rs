//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::collections::HashMap;

use tracing::trace;

/// Bytecode offsets of every label seen so far.
#[derive(Debug, Clone, Default)]
pub struct JumpLabels {
	offsets: HashMap<String, u32>,
}

impl JumpLabels {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records `name` at `offset`. A redefinition replaces the earlier offset.
	pub fn add(&mut self, name: impl Into<String>, offset: u32) {
		let name = name.into();
		if let Some(previous) = self.offsets.insert(name.clone(), offset) {
			trace!(%name, previous, offset, "label redefined");
		}
	}

	pub fn fetch(&self, name: &str) -> Option<u32> {
		self.offsets.get(name).copied()
	}

	pub fn all(&self) -> &HashMap<String, u32> {
		&self.offsets
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn redefinition_overwrites() {
		let mut labels = JumpLabels::new();
		labels.add("top", 0);
		labels.add("end", 12);
		labels.add("top", 6);
		assert_eq!(labels.fetch("top"), Some(6));
		assert_eq!(labels.fetch("end"), Some(12));
		assert_eq!(labels.fetch("missing"), None);
		assert_eq!(labels.all().len(), 2);
	}
}

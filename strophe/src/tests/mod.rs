// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

pub(crate) mod utils;

mod test_attributes;
mod test_basic;
mod test_shape;
mod test_styles;
mod test_wrap;

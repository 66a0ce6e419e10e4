// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod brands;
pub mod orders;
pub mod items;
pub mod distribute;
pub mod reports;
pub mod exporter;
pub mod settings;
pub mod doctor;

// SPDX-License-Identifier: MIT

//! Request middleware.

pub mod api_key;

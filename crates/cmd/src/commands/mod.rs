// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod query;
pub mod schema;
pub mod tables;

pub use query::query_command;
pub use schema::schema_command;
pub use tables::tables_command;

// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

//! Typed GraphQL documents for the Art Blocks subgraph, the Hasura-backed
//! metadata database, and the graph-node indexing status API.
//!
//! Each operation is a `graphql_client` derive against one of the checked-in
//! schemas under `graphql/`. Only types reachable from a declared operation
//! are generated; the rest of the schema surface stays in the SDL files.

use graphql_client::GraphQLQuery;

pub mod core_contracts {
    use graphql_client::GraphQLQuery;

    // Subgraph scalars are strings on the wire: BigInt as a decimal
    // string, Bytes as a 0x-prefixed hex string.
    type BigInt = String;
    type Bytes = String;

    #[derive(GraphQLQuery)]
    #[graphql(
        schema_path = "graphql/artblocks.schema.graphql",
        query_path = "graphql/core_contracts.query.graphql",
        response_derives = "Debug, Clone",
        variables_derives = "Clone, Debug"
    )]
    pub struct CoreContracts;

    pub use core_contracts::*;
}

pub mod insert_contracts_metadata {
    use graphql_client::GraphQLQuery;

    #[allow(non_camel_case_types)]
    type timestamptz = String;

    #[derive(GraphQLQuery)]
    #[graphql(
        schema_path = "graphql/metadata.schema.graphql",
        query_path = "graphql/insert_contracts_metadata.mutation.graphql",
        response_derives = "Debug, Clone, PartialEq, Eq",
        variables_derives = "Clone, Debug",
        skip_serializing_none
    )]
    pub struct InsertContractsMetadata;

    pub use insert_contracts_metadata::*;
}

pub mod contracts_metadata_details {
    use graphql_client::GraphQLQuery;

    #[derive(GraphQLQuery)]
    #[graphql(
        schema_path = "graphql/metadata.schema.graphql",
        query_path = "graphql/contracts_metadata.query.graphql",
        response_derives = "Debug, Clone, PartialEq, Eq",
        variables_derives = "Clone, Debug"
    )]
    pub struct ContractsMetadataDetails;

    pub use contracts_metadata_details::*;
}

pub mod contracts_metadata_by_address {
    use graphql_client::GraphQLQuery;

    #[derive(GraphQLQuery)]
    #[graphql(
        schema_path = "graphql/metadata.schema.graphql",
        query_path = "graphql/contracts_metadata_by_address.query.graphql",
        response_derives = "Debug, Clone, PartialEq, Eq",
        variables_derives = "Clone, Debug"
    )]
    pub struct ContractsMetadataByAddress;

    pub use contracts_metadata_by_address::*;
}

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/status.schema.graphql",
    query_path = "graphql/deployment_status.query.graphql",
    response_derives = "Debug, Clone, PartialEq, Eq",
    variables_derives = "Clone, Debug"
)]
pub struct DeploymentStatusQuery;

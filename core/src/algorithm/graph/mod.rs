//! Graph algorithms over capacitated networks
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod max_flow;

pub use self::max_flow::{
    Capacity, Flow, FlowEdge, FlowError, FlowMetrics, FlowNetwork, MaxFlowResult, MaxFlowSolver,
    VertexId,
};

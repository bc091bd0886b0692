pub mod plan;
pub mod init;

pub use plan::{execute_plan, plan_from_snapshot, report_plan, write_graph, PlanResult, PlanReport};
pub use init::execute_init;

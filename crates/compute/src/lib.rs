pub mod aggregate;
pub mod filter;
pub mod top;

pub use aggregate::{
    month_name, summary_by, summary_by_client, summary_by_month, summary_by_task_type,
    summary_by_technician, GroupTotal, MonthTotal,
};
pub use filter::{FilterOptions, RecordFilter};
pub use top::{
    top_technicians_with_client_breakdown, ClientBreakdown, TopTechnicians, DEFAULT_TOP_N,
};

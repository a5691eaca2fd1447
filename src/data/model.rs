use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Column names of the opportunity source
// ---------------------------------------------------------------------------

pub mod columns {
    pub const DEAL_ID: &str = "Deal_ID";
    pub const REGION: &str = "Region";
    /// Raw segment column; renamed to [`CUSTOMER_SEGMENT`] right after load.
    pub const COMPANY_SIZE: &str = "Company_Size";
    pub const CUSTOMER_SEGMENT: &str = "Customer_Segment";
    pub const DEAL_STAGE: &str = "Deal_Stage";
    pub const DEAL_SIZE: &str = "Deal_Size";
    pub const LEAD_SOURCE: &str = "Lead_Source";
    pub const SALESPERSON: &str = "Salesperson";
    pub const DEAL_CLOSURE_DATE: &str = "Deal_Closure_Date";
}

/// Terminal stage carrying realized revenue.
pub const CLOSED_WON: &str = "Closed Won";
/// Terminal stage without revenue.
pub const CLOSED_LOST: &str = "Closed Lost";

// ---------------------------------------------------------------------------
// Opportunity – one row of the dataset
// ---------------------------------------------------------------------------

/// A single sales opportunity.
///
/// Categorical fields are empty when the source cell was blank; such rows are
/// kept but never form a group of their own.
#[derive(Debug, Clone, PartialEq)]
pub struct Opportunity {
    pub deal_id: String,
    pub region: String,
    pub customer_segment: String,
    pub deal_stage: String,
    /// Monetary value (GBP).
    pub deal_size: f64,
    pub lead_source: String,
    pub salesperson: String,
    /// Raw closure date text; `None` when the cell is empty.
    /// Parsing happens in the revenue report, which drops unparsable values.
    pub deal_closure_date: Option<String>,
}

impl Opportunity {
    /// Open (pipeline) deals are every stage except the two terminal ones.
    pub fn is_open(&self) -> bool {
        self.deal_stage != CLOSED_WON && self.deal_stage != CLOSED_LOST
    }

    pub fn is_closed_won(&self) -> bool {
        self.deal_stage == CLOSED_WON
    }
}

// ---------------------------------------------------------------------------
// OpportunityTable – the immutable base table
// ---------------------------------------------------------------------------

/// The full loaded dataset with the selection universes observed at load time.
#[derive(Debug, Clone, Default)]
pub struct OpportunityTable {
    pub rows: Vec<Opportunity>,
    pub regions: BTreeSet<String>,
    pub segments: BTreeSet<String>,
    pub stages: BTreeSet<String>,
}

impl OpportunityTable {
    /// Build the distinct-value indices from the loaded rows.
    pub fn from_rows(rows: Vec<Opportunity>) -> Self {
        let mut regions = BTreeSet::new();
        let mut segments = BTreeSet::new();
        let mut stages = BTreeSet::new();

        for row in &rows {
            for (set, value) in [
                (&mut regions, &row.region),
                (&mut segments, &row.customer_segment),
                (&mut stages, &row.deal_stage),
            ] {
                if !value.is_empty() {
                    set.insert(value.clone());
                }
            }
        }

        OpportunityTable {
            rows,
            regions,
            segments,
            stages,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

//! Join shapes for the cross-chain categories
//!
//! Each category reads one event table, joins the downstream execution and
//! resolves execution time through the block header directory. Callers narrow
//! the shape with a filter so ranged listings and exact lookups share it.

use primitives::Page;

/// Listing order for event tables keyed by event id: newest block first.
pub const EVENT_ORDER: &str = "block_number DESC, tx_hash DESC, event_id DESC";
/// Listing order for vault deposits, which are keyed by output index.
pub const DEPOSIT_ORDER: &str = "block_number DESC, tx_hash DESC, log_index DESC";

/// A `SELECT` over a fixed join shape plus bound filter values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    columns: String,
    from: String,
    filters: Vec<String>,
    binds: Vec<String>,
    order: &'static str,
}

impl SelectQuery {
    /// Start a query from a column list and a `FROM ... JOIN ...` clause.
    pub fn new(columns: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            columns: columns.into(),
            from: from.into(),
            filters: Vec::new(),
            binds: Vec::new(),
            order: EVENT_ORDER,
        }
    }

    /// Replace the listing order.
    pub const fn order_by(mut self, order: &'static str) -> Self {
        self.order = order;
        self
    }

    /// Add a literal predicate.
    pub fn filter(mut self, predicate: impl Into<String>) -> Self {
        self.filters.push(predicate.into());
        self
    }

    /// Add `column = value`, binding the value.
    pub fn filter_eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.filters.push(format!("{column} = ?"));
        self.binds.push(value.into());
        self
    }

    /// Add `column <> value`, binding the value.
    pub fn filter_ne(mut self, column: &str, value: impl Into<String>) -> Self {
        self.filters.push(format!("{column} <> ?"));
        self.binds.push(value.into());
        self
    }

    /// Values for the `?` placeholders, in order of appearance.
    pub fn binds(&self) -> &[String] {
        &self.binds
    }

    /// The filtered join without ordering or windowing.
    pub fn sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.columns, self.from);
        if !self.filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filters.join(" AND "));
        }
        sql
    }

    /// Row count of the filtered join.
    pub fn count_sql(&self) -> String {
        format!("SELECT count() AS total FROM ({})", self.sql())
    }

    /// One window of the filtered join in listing order.
    pub fn window_sql(&self, page: Page) -> String {
        format!(
            "{} ORDER BY {} LIMIT {} OFFSET {}",
            self.sql(),
            self.order,
            page.size,
            page.offset
        )
    }

    /// First row of the filtered join in listing order.
    pub fn first_sql(&self) -> String {
        format!("{} ORDER BY {} LIMIT 1", self.sql(), self.order)
    }
}

/// Vault deposits joined with command execution and execution block time.
pub fn bridge_query(db: &str, filter: impl FnOnce(SelectQuery) -> SelectQuery) -> SelectQuery {
    let columns = "vt.tx_hash AS tx_hash, \
                   vt.block_number AS block_number, \
                   vt.log_index AS log_index, \
                   vt.timestamp AS timestamp, \
                   vt.chain AS chain, \
                   vt.staker_script_pubkey AS staker_script_pubkey, \
                   vt.destination_chain AS destination_chain, \
                   vt.destination_recipient_address AS destination_recipient_address, \
                   vt.destination_token_address AS destination_token_address, \
                   vt.symbol AS symbol, \
                   vt.amount AS amount, \
                   'pending' AS status, \
                   ce.command_id AS command_id, \
                   ce.tx_hash AS executed_tx_hash, \
                   ce.block_number AS executed_block_number, \
                   ce.address AS executed_address, \
                   ebh.block_time AS executed_at";
    let from = format!(
        "{db}.vault_transactions vt \
         LEFT JOIN {db}.command_executeds ce ON vt.tx_hash = ce.command_id \
         LEFT JOIN {db}.block_headers ebh \
           ON ce.chain = ebh.chain AND ce.block_number = ebh.block_number"
    );
    let query = SelectQuery::new(columns, from)
        .order_by(DEPOSIT_ORDER)
        .filter("vt.timestamp > 0 AND vt.amount > 0");
    filter(query)
}

/// Token-sent events joined with command execution and execution block time.
pub fn transfer_query(db: &str, filter: impl FnOnce(SelectQuery) -> SelectQuery) -> SelectQuery {
    let columns = "ts.event_id AS event_id, \
                   ts.tx_hash AS tx_hash, \
                   ts.block_number AS block_number, \
                   ts.log_index AS log_index, \
                   ts.block_time AS block_time, \
                   ts.source_chain AS source_chain, \
                   ts.source_address AS source_address, \
                   ts.destination_chain AS destination_chain, \
                   ts.destination_address AS destination_address, \
                   ts.token_contract_address AS token_contract_address, \
                   ts.symbol AS symbol, \
                   ts.amount AS amount, \
                   ts.status AS status, \
                   ce.command_id AS command_id, \
                   ce.tx_hash AS executed_tx_hash, \
                   ce.block_number AS executed_block_number, \
                   ce.address AS executed_address, \
                   ebh.block_time AS executed_at";
    let from = format!(
        "{db}.token_sents ts \
         LEFT JOIN {db}.command_executeds ce ON ts.tx_hash = ce.command_id \
         LEFT JOIN {db}.block_headers ebh \
           ON ce.chain = ebh.chain AND ce.block_number = ebh.block_number"
    );
    filter(SelectQuery::new(columns, from).filter("ts.amount > 0"))
}

/// Redemption requests joined with the custodian settlement of the same
/// session and the request block time.
pub fn redeem_query(db: &str, filter: impl FnOnce(SelectQuery) -> SelectQuery) -> SelectQuery {
    let columns = "ert.event_id AS event_id, \
                   ert.tx_hash AS tx_hash, \
                   ert.block_number AS block_number, \
                   ert.log_index AS log_index, \
                   sbh.block_time AS block_time, \
                   ert.source_chain AS source_chain, \
                   ert.source_address AS source_address, \
                   ert.destination_chain AS destination_chain, \
                   ert.destination_address AS destination_address, \
                   ert.token_contract_address AS token_contract_address, \
                   ert.symbol AS symbol, \
                   ert.amount AS amount, \
                   ert.status AS status, \
                   ert.custodian_group_uid AS custodian_group_uid, \
                   ert.session_sequence AS session_sequence, \
                   brt.tx_hash AS settlement_tx_hash, \
                   brt.block_number AS settlement_block_number, \
                   brt.block_time AS settlement_at";
    let from = format!(
        "{db}.evm_redeem_txes ert \
         LEFT JOIN {db}.btc_redeem_txes brt \
           ON ert.custodian_group_uid = brt.custodian_group_uid \
          AND ert.session_sequence = brt.session_sequence \
         LEFT JOIN {db}.block_headers sbh \
           ON ert.source_chain = sbh.chain AND ert.block_number = sbh.block_number"
    );
    filter(SelectQuery::new(columns, from).filter("ert.amount > 0"))
}

use std::cmp::Ordering;

use itertools::Itertools;

use crate::{
    club::model::{Customer, Purchase},
    constants::CLUB,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SortColumn {
    Date,
    Amount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PendingAction {
    Edit(Purchase),
    Delete(Purchase),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    Success(String),
    Error(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableRow<'a> {
    pub number: usize,
    pub purchase: &'a Purchase,
    pub flagged: bool,
}

#[derive(Clone, Debug)]
pub struct PurchaseTable {
    purchases: Vec<Purchase>,
    order_by: SortColumn,
    order: SortOrder,
    page: usize,
    rows_per_page: usize,
    pending: Option<PendingAction>,
    notice: Option<Notice>,
}

impl PurchaseTable {
    pub fn new(purchases: Vec<Purchase>) -> Self {
        Self {
            purchases,
            order_by: SortColumn::Date,
            order: SortOrder::Asc,
            page: 0,
            rows_per_page: CLUB.page_sizes[0],
            pending: None,
            notice: None,
        }
    }

    pub fn order_by(&self) -> SortColumn {
        self.order_by
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn len(&self) -> usize {
        self.purchases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.purchases.is_empty()
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn request_sort(&mut self, column: SortColumn) {
        self.order = if self.order_by == column && self.order == SortOrder::Asc {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        };
        self.order_by = column;
    }

    pub fn page_count(&self) -> usize {
        self.purchases.len().div_ceil(self.rows_per_page).max(1)
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.min(self.page_count() - 1);
    }

    pub fn set_rows_per_page(&mut self, rows_per_page: usize) {
        self.rows_per_page = rows_per_page.max(1);
        self.page = 0;
    }

    pub fn sorted(&self) -> Vec<&Purchase> {
        let compare = |a: &&Purchase, b: &&Purchase| -> Ordering {
            let ordering = match self.order_by {
                SortColumn::Date => a.date.cmp(&b.date),
                SortColumn::Amount => a.amount.total_cmp(&b.amount),
            };
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        };
        self.purchases.iter().sorted_by(compare).collect()
    }

    pub fn page_rows(&self) -> Vec<TableRow<'_>> {
        let start = self.page * self.rows_per_page;
        self.sorted()
            .into_iter()
            .enumerate()
            .skip(start)
            .take(self.rows_per_page)
            .map(|(index, purchase)| TableRow {
                number: index + 1,
                purchase,
                flagged: purchase.is_over_threshold(),
            })
            .collect()
    }

    pub fn find(&self, id: u64) -> Option<&Purchase> {
        self.purchases.iter().find(|p| p.id == id)
    }

    pub fn begin_edit(&mut self, id: u64) -> bool {
        self.begin(id, PendingAction::Edit)
    }

    pub fn begin_delete(&mut self, id: u64) -> bool {
        self.begin(id, PendingAction::Delete)
    }

    fn begin(&mut self, id: u64, action: fn(Purchase) -> PendingAction) -> bool {
        match self.find(id).cloned() {
            Some(purchase) => {
                self.pending = Some(action(purchase));
                true
            }
            None => false,
        }
    }

    pub fn cancel_action(&mut self) {
        self.pending = None;
    }

    pub fn confirm(&mut self, customer: &Customer, message: impl Into<String>) {
        self.purchases = customer.purchases.clone();
        self.pending = None;
        self.notice = Some(Notice::Success(message.into()));
        self.set_page(self.page);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice::Error(message.into()));
    }
}

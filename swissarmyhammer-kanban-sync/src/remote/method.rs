//! Remote method names

pub const ADD_COLUMN: &str = "frappe.desk.doctype.kanban_board.kanban_board.add_column";
pub const ARCHIVE_RESTORE_COLUMN: &str =
    "frappe.desk.doctype.kanban_board.kanban_board.archive_restore_column";
pub const ADD_CARD: &str = "frappe.desk.doctype.kanban_board.kanban_board.add_card";
pub const UPDATE_ORDER_FOR_SINGLE_CARD: &str =
    "frappe.desk.doctype.kanban_board.kanban_board.update_order_for_single_card";
pub const UPDATE_ORDER: &str = "frappe.desk.doctype.kanban_board.kanban_board.update_order";
pub const UPDATE_COLUMN_ORDER: &str =
    "frappe.desk.doctype.kanban_board.kanban_board.update_column_order";
pub const SET_INDICATOR: &str = "frappe.desk.doctype.kanban_board.kanban_board.set_indicator";

pub const FETCH_TO_CUSTOMIZE: &str = "fetch_to_customize";
pub const SAVE_CUSTOMIZATION: &str = "save_customization";

pub const INSERT: &str = "frappe.client.insert";
pub const GET_LIST: &str = "frappe.client.get_list";
pub const GET_DOC: &str = "frappe.desk.form.load.getdoc";
pub const REPORTVIEW_GET: &str = "frappe.desk.reportview.get";

//! Bare server-rendered pages. Anything that came from a form or a record file is escaped.

use crate::features::{Banker, BlockchainId, Transaction, User};
use std::fmt::Write;

pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Percent-encodes an id so it fits in a single path segment.
fn encode_segment(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => {
                let _ = write!(encoded, "%{:02X}", byte);
            }
        }
    }
    encoded
}

pub(crate) fn user_page_path(blockchain_id: &BlockchainId) -> String {
    format!("/user-page/{}", encode_segment(blockchain_id.as_str()))
}

pub(crate) fn banker_page_path(blockchain_id: &BlockchainId) -> String {
    format!("/banker-page/{}", encode_segment(blockchain_id.as_str()))
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n\
         <body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

const PROFILE_FIELDS: &str = "\
<label>Name <input name=\"name\" required></label><br>
<label>Email <input name=\"email\" type=\"email\" required></label><br>
<label>Age <input name=\"age\" required></label><br>
<label>Address <input name=\"address\" required></label><br>
<label>Account <input name=\"account\" required></label><br>
<label>Branch <input name=\"branch\" required></label><br>";

pub(crate) fn home() -> String {
    layout(
        "Bank",
        "<h1>Bank</h1>\n<ul>\n\
         <li><a href=\"/user-login\">User login</a></li>\n\
         <li><a href=\"/banker-login\">Banker login</a></li>\n</ul>",
    )
}

pub(crate) fn user_login() -> String {
    let form = format!(
        "<h1>User login</h1>\n<form method=\"post\">\n{}\n\
         <label><input type=\"checkbox\" name=\"blockchain_option\" value=\"yes\"> \
         I already have a blockchain id</label><br>\n\
         <label>Blockchain id <input name=\"blockchain_id\"></label><br>\n\
         <button type=\"submit\">Continue</button>\n</form>",
        PROFILE_FIELDS
    );
    layout("User login", &form)
}

pub(crate) fn banker_login() -> String {
    let form = format!(
        "<h1>Banker login</h1>\n<form method=\"post\">\n{}\n\
         <label>Resignation <input name=\"resignation\" required></label><br>\n\
         <button type=\"submit\">Continue</button>\n</form>",
        PROFILE_FIELDS
    );
    layout("Banker login", &form)
}

fn transactions_table(transactions: &[Transaction]) -> String {
    let mut html = String::from(
        "<table>\n<tr><th>Sender</th><th>Receiver</th><th>Amount</th><th>Time</th></tr>\n",
    );
    for transaction in transactions {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(transaction.sender_id.as_str()),
            escape(transaction.receiver_id.as_str()),
            transaction.amount,
            escape(&transaction.timestamp)
        );
    }
    html.push_str("</table>");
    html
}

pub(crate) fn user_page(user: &User) -> String {
    let profile = &user.profile;
    let body = format!(
        "<h1>{name}</h1>\n\
         <p>Blockchain id: <code>{id}</code></p>\n\
         <p>{email} &middot; age {age} &middot; {address}</p>\n\
         <p>Account {account} at {branch}</p>\n\
         <h2>Transfer</h2>\n\
         <form method=\"post\" action=\"{action}\">\n\
         <label>Receiver id <input name=\"receiver_id\" required></label>\n\
         <label>Amount <input name=\"amount\" required></label>\n\
         <button type=\"submit\">Send</button>\n</form>\n\
         <h2>History</h2>\n{history}",
        name = escape(&profile.name),
        id = escape(user.blockchain_id.as_str()),
        email = escape(&profile.email),
        age = escape(&profile.age),
        address = escape(&profile.address),
        account = escape(&profile.account),
        branch = escape(&profile.branch),
        action = escape(&user_page_path(&user.blockchain_id)),
        history = transactions_table(&user.transactions),
    );
    layout(&profile.name, &body)
}

pub(crate) fn banker_page(
    banker: &Banker,
    transactions: &[Transaction],
    users: &[User],
) -> String {
    let mut user_rows = String::from(
        "<table>\n<tr><th>Name</th><th>Blockchain id</th><th>Account</th>\
         <th>Transactions today</th></tr>\n",
    );
    for user in users {
        let _ = writeln!(
            user_rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&user.profile.name),
            escape(user.blockchain_id.as_str()),
            escape(&user.profile.account),
            user.transactions_count
        );
    }
    user_rows.push_str("</table>");

    let body = format!(
        "<h1>{name}</h1>\n\
         <p>Blockchain id: <code>{id}</code></p>\n\
         <p>Branch {branch} &middot; resignation {resignation} &middot; \
         {notified} users notified</p>\n\
         <h2>Users</h2>\n{users}\n\
         <h2>Transactions</h2>\n{transactions}",
        name = escape(&banker.profile.name),
        id = escape(banker.blockchain_id.as_str()),
        branch = escape(&banker.profile.branch),
        resignation = escape(&banker.resignation),
        notified = banker.users.len(),
        users = user_rows,
        transactions = transactions_table(transactions),
    );
    layout(&banker.profile.name, &body)
}

use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER: &str = "Order,Account,Name,Address,Description,Type,Entered,Sent,\
Qty,List,Nett,Cost,Route,Reference,P'list,FOC,O/T,Promo";

/// One order line with the fields the tests care about; everything else is
/// boilerplate the pipeline carries through.
pub fn order_line(
    order: &str,
    name: &str,
    entered: &str,
    sent: &str,
    qty: &str,
    nett: &str,
    cost: &str,
    order_type: &str,
) -> String {
    format!(
        "{order},ACC1,{name},1 High Street,Widget,STD,{entered},{sent},{qty},12.50,{nett},{cost},R1,REF,PL1,N,{order_type},Y"
    )
}

pub fn write_orders_csv(dir: &Path, file_name: &str, lines: &[String]) -> PathBuf {
    let path = dir.join(file_name);
    let mut contents = String::from(HEADER);
    contents.push('\n');
    for line in lines {
        contents.push_str(line);
        contents.push('\n');
    }
    fs::write(&path, contents).expect("write fixture csv");
    path
}

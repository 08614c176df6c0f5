//! Handler for `depsolver csv-to-json`.

use std::path::Path;

use miette::Result;

use depsolver_ops::ops_convert;

pub fn exec(file: &Path) -> Result<()> {
    println!("{}", ops_convert::csv_to_json(file)?);
    Ok(())
}

pub fn run() -> anyhow::Result<()> {
    println!("obsmem {}", env!("CARGO_PKG_VERSION"));
    println!("Observational memory for AI coding agents");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_output() {
        assert!(run().is_ok());
    }
}

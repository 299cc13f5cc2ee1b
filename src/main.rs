// Demo driver - walks the full loan lifecycle against one engine.
// The library never prints; this binary is the presentation layer.

use anyhow::Result;
use rust_decimal_macros::dec;

use loan_ledger::{
    find_across_shards, rank, LedgerSnapshot, LoanLedger, Shard, VERSION,
};

fn main() -> Result<()> {
    println!("🏦 Loan Ledger Engine v{}", VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let engine = LoanLedger::new();

    // 1. Registration
    println!("\n👤 Registering users...");
    let owner = engine.register_user()?;
    engine.register_user()?;
    println!("✓ Registered {} users", engine.registry().user_count());

    let pool = engine.open_account(owner, dec!(5000))?;
    println!("✓ Opened funding account {} with balance 5000", pool);

    // 2. Admission
    println!("\n📋 Requesting loans...");
    let loans = [
        engine.request_loan(dec!(800), dec!(5), 12, Some("vehicle".to_string()))?,
        engine.request_loan(dec!(950), dec!(7), 6, None)?,
        engine.request_loan(dec!(1500), dec!(5), 24, None)?,
    ];
    for loan_id in loans {
        let decision = engine.approve_loan(loan_id)?;
        let loan = engine.loan(loan_id)?;
        println!(
            "✓ Loan {} ({} over {} months): {:?}",
            loan_id, loan.principal, loan.duration_months, decision
        );
    }

    // 3. Pricing and disbursement
    println!("\n💸 Disbursing approved loans...");
    for loan_id in [loans[0], loans[1]] {
        let quote = engine.quote(loan_id)?;
        engine.disburse(loan_id, pool)?;
        println!("✓ Loan {} disbursed (interest quote: {})", loan_id, quote);
    }
    println!("✓ Pool balance now {}", engine.balance_of(pool)?);

    // 4. Repayment
    println!("\n💰 Repaying...");
    for loan_id in [loans[0], loans[1]] {
        let run = engine.repay(loan_id)?;
        println!(
            "✓ Loan {} closed in {} increments (accumulator {})",
            loan_id, run.steps, run.accumulator
        );
    }
    println!("✓ Pool balance restored to {}", engine.balance_of(pool)?);

    // 5. Ranking
    println!("\n📊 Ranking loan book by principal...");
    let amounts: Vec<_> = engine
        .registry()
        .loans_snapshot()
        .iter()
        .map(|loan| loan.principal)
        .collect();
    let report = rank(&amounts);
    println!("✓ {}", report.summary());

    // 6. Sharded lookup
    println!("\n🌐 Querying ledger shards...");
    let local = Shard::from_keys(0, "local", &[1, 2, 3, 4, 5]);
    let remote = Shard::from_keys(1, "remote", &[6, 7, 8, 9, 10]);
    println!("✓ key 3 found: {}", find_across_shards(3, &local, &[remote.clone()]));
    println!("✓ key 11 found: {}", find_across_shards(11, &local, &[remote]));

    // 7. Snapshot
    println!("\n💾 Capturing snapshot...");
    let snapshot = LedgerSnapshot::capture(&engine);
    snapshot.validate()?;
    println!(
        "✓ Snapshot valid: {} users, {} loans, {} accounts",
        snapshot.user_count,
        snapshot.loan_count,
        snapshot.accounts.len()
    );

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Lifecycle complete");
    Ok(())
}

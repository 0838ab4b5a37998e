//! Transaction commands

use anyhow::Result;
use creditline_business::{AdmissionEngine, ServiceContext};
use creditline_core::TransactionRequest;
use uuid::Uuid;

use crate::TxAction;

/// Handle tx subcommands
pub async fn handle(ctx: &ServiceContext, action: TxAction) -> Result<()> {
    let engine = AdmissionEngine::new(ctx);

    match action {
        TxAction::Admit {
            customer_id,
            tenor,
            otr,
            contract,
            admin_fee,
            installment,
            interest,
            asset,
        } => {
            let request = TransactionRequest {
                contract_number: contract.unwrap_or_else(generate_contract_number),
                otr,
                admin_fee,
                installment_amount: installment,
                interest_amount: interest,
                asset_name: asset,
                tenor,
            };

            let txn = engine.admit(customer_id, &request).await?;
            println!("✅ Transaction admitted");
            println!("   ID:       {}", txn.id);
            println!("   Contract: {}", txn.contract_number);
            println!("   Tenor:    {} month(s)", txn.tenor);
            println!("   OTR:      {}", txn.otr);
            println!("   Status:   {}", txn.status.as_str());
        }
        TxAction::List {
            customer_id,
            page,
            per_page,
        } => {
            let result = engine
                .transactions_for_customer(customer_id, page, per_page)
                .await?;
            println!(
                "📋 Transactions for customer {} (page {}/{}, {} total)",
                customer_id,
                result.page,
                result.total_pages(),
                result.total
            );
            for txn in result.items {
                println!(
                    "   #{:<6} {:<20} {:>1}m {:>16}  {:<8} {}",
                    txn.id,
                    txn.contract_number,
                    txn.tenor,
                    txn.otr,
                    txn.status.as_str(),
                    txn.asset_name
                );
            }
        }
    }

    ctx.pool().close().await;
    Ok(())
}

/// Contract number cho request không ghi rõ
fn generate_contract_number() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("CTR-{}", id[..12].to_uppercase())
}

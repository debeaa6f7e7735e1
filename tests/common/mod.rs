use gigpay::domain::{Balance, Contract, ContractStatus, Job, Profile, Role};
use gigpay::infrastructure::in_memory::MemoryLedger;
use rust_decimal::Decimal;

pub fn client(id: u32, balance: Decimal) -> Profile {
    Profile {
        id,
        first_name: "Client".to_string(),
        last_name: format!("Number{id}"),
        profession: "Manager".to_string(),
        role: Role::Client,
        balance: Balance::new(balance),
    }
}

pub fn contractor(id: u32, balance: Decimal) -> Profile {
    Profile {
        id,
        first_name: "Contractor".to_string(),
        last_name: format!("Number{id}"),
        profession: "Welder".to_string(),
        role: Role::Contractor,
        balance: Balance::new(balance),
    }
}

pub fn contract(id: u32, client_id: u32, contractor_id: u32) -> Contract {
    Contract {
        id,
        client_id,
        contractor_id,
        terms: "ongoing work".to_string(),
        status: ContractStatus::InProgress,
    }
}

pub fn job(id: u32, contract_id: u32, price: Decimal) -> Job {
    Job {
        id,
        contract_id,
        description: format!("job {id}"),
        price: price.try_into().unwrap(),
        paid: false,
        payment_date: None,
    }
}

/// Sum of all committed balances, for conservation assertions.
pub async fn total_balance(ledger: &MemoryLedger) -> Decimal {
    let mut total = Decimal::ZERO;
    for profile in ledger.profiles().await {
        total += profile.balance.value();
    }
    total
}

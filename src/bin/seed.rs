use chrono::{Duration, NaiveDate, Utc};
use clap::Parser;
use fake::faker::address::en::CountryName;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rand::Rng;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use clubpass::{
    auth::AuthService,
    domain::{
        IdentificationType, MembershipTier, NewMember, Payment, PaymentMethod, PaymentPurpose,
    },
    repository::{
        MemberRepository, PaymentRepository, SqliteMemberRepository, SqlitePaymentRepository,
    },
};

/// Fills a development database with an admin and generated members.
#[derive(Parser, Debug)]
#[command(name = "seed")]
struct Args {
    /// SQLite connection string
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://clubpass.db?mode=rwc")]
    database_url: String,

    /// Number of generated members
    #[arg(long, default_value_t = 25)]
    members: usize,

    /// Club assigned to generated members
    #[arg(long, default_value = "El Jardin Verde")]
    club: String,

    #[arg(long, default_value = "admin@clubpass.local")]
    admin_email: String,

    #[arg(long, default_value = "admin12345")]
    admin_password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    println!("🌱 Starting database seeding...");

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&args.database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let member_repo = SqliteMemberRepository::new(db_pool.clone());
    let payment_repo = SqlitePaymentRepository::new(db_pool.clone());

    println!("👥 Creating members...");

    if member_repo.find_by_email(&args.admin_email).await?.is_none() {
        member_repo
            .create(NewMember {
                id: Uuid::new_v4(),
                email: args.admin_email.clone(),
                password_hash: AuthService::hash_password(&args.admin_password).await?,
                first_name: "Admin".to_string(),
                last_name: "User".to_string(),
                country: "Spain".to_string(),
                club: args.club.clone(),
                date_of_birth: NaiveDate::from_ymd_opt(1985, 1, 1)
                    .ok_or_else(|| anyhow::anyhow!("invalid date"))?,
                place_of_birth: "Barcelona".to_string(),
                identification_type: IdentificationType::IdCard,
                identification_number: "ADMIN-0001".to_string(),
                membership_type: MembershipTier::Vip,
                activated_at: Utc::now(),
                photo_url: String::new(),
                id_photo_url: String::new(),
                payment_method: PaymentMethod::Exempt,
                transaction_id: None,
                is_admin: true,
            })
            .await?;
        println!("  ✅ Created admin user ({} / {})", args.admin_email, args.admin_password);
    }

    let password_hash = AuthService::hash_password("password123").await?;
    let mut rng = rand::thread_rng();

    for i in 0..args.members {
        let first_name: String = FirstName().fake();
        let last_name: String = LastName().fake();
        let country: String = CountryName().fake();

        let tier = if rng.gen_bool(0.3) {
            MembershipTier::Vip
        } else {
            MembershipTier::Regular
        };
        let payment_method = match rng.gen_range(0..3) {
            0 => PaymentMethod::Cash,
            1 => PaymentMethod::CreditCard,
            _ => PaymentMethod::Exempt,
        };
        let transaction_id = (payment_method == PaymentMethod::CreditCard)
            .then(|| format!("pi_seed_{}", Uuid::new_v4().simple()));

        let age_days = rng.gen_range(21 * 365..70 * 365);
        let date_of_birth = (Utc::now() - Duration::days(age_days)).date_naive();
        let activated_at = Utc::now() - Duration::days(rng.gen_range(0..300));

        let member = member_repo
            .create(NewMember {
                id: Uuid::new_v4(),
                email: format!(
                    "{}.{}{}@example.com",
                    first_name.to_lowercase(),
                    last_name.to_lowercase(),
                    i
                ),
                password_hash: password_hash.clone(),
                first_name,
                last_name,
                country,
                club: args.club.clone(),
                date_of_birth,
                place_of_birth: "Unknown".to_string(),
                identification_type: IdentificationType::Passport,
                identification_number: format!("P{:08}", rng.gen_range(0..100_000_000)),
                membership_type: if payment_method == PaymentMethod::Exempt {
                    MembershipTier::Regular
                } else {
                    tier
                },
                activated_at,
                photo_url: String::new(),
                id_photo_url: String::new(),
                payment_method,
                transaction_id: transaction_id.clone(),
                is_admin: false,
            })
            .await?;

        if payment_method != PaymentMethod::Exempt {
            let amount_cents = match member.membership_type {
                MembershipTier::Regular => 2500,
                MembershipTier::Vip => 5000,
            };
            payment_repo
                .create(Payment {
                    id: Uuid::new_v4(),
                    member_id: member.id,
                    amount_cents,
                    currency: "eur".to_string(),
                    payment_method,
                    purpose: if payment_method == PaymentMethod::Cash {
                        PaymentPurpose::Enrollment
                    } else {
                        PaymentPurpose::Registration
                    },
                    transaction_id,
                    created_at: activated_at,
                })
                .await?;
        }
    }

    println!("  ✅ Created {} members (password: password123)", args.members);
    println!("🎉 Seeding complete!");

    Ok(())
}

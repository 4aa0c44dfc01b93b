use super::{HealthTable, StaticBpsTable};

const INF: f64 = f64::INFINITY;
const NEG_INF: f64 = f64::NEG_INFINITY;

impl StaticBpsTable {
    pub fn house_loan() -> Self {
        Self::new([
            ("PreviousLoanDefaults", 13.837),
            ("Age", 9.548),
            ("EstimatedSalary", 6.981),
            ("CreditScore", 6.456),
            ("NumOfProducts", 5.913),
            ("DebtToIncomeRatio", 5.706),
            ("NetWorth", 5.453),
            ("Balance", 4.724),
            ("MonthlyIncome", 5.245),
            ("Tenure", 3.162),
            ("TotalDebtToIncomeRatio", 3.87),
            ("EmploymentStatus", 3.667),
            ("AnnualIncome", 2.834),
            ("IsActiveMember", 1.921),
            ("Gender", 0.747),
            ("CreditCardUtilizationRate", 0.719),
            ("TotalAssets", 0.671),
            ("HasCrCard", 0.549),
            ("EducationLevel", 0.527),
            ("LoanDuration", 0.325),
            ("LoanAmount", 0.255),
            ("SavingsAccountBalance", 0.169),
            ("NumberOfOpenCreditLines", 0.166),
            ("HomeOwnershipStatus", 0.165),
            ("TotalLiabilities", 0.157),
            ("MonthlyDebtPayments", 0.155),
            ("PaymentHistory", 0.152),
            ("UtilityBillsPaymentHistory", 0.151),
            ("JobTenure", 0.145),
            ("CheckingAccountBalance", 0.138),
            ("NumberOfCreditInquiries", 0.137),
            ("MaritalStatus", 0.131),
            ("LoanPurpose", 0.121),
            ("NumberOfDependents", 0.106),
        ])
    }

    pub fn fixed_deposit() -> Self {
        Self::new([
            ("Age", 20.0),
            ("EstimatedSalary", 14.9),
            ("CreditScore", 13.781),
            ("NumOfProducts", 12.621),
            ("Balance", 10.082),
            ("Tenure", 6.75),
            ("IsActiveMember", 4.101),
            ("Gender", 1.595),
            ("HasCrCard", 1.171),
        ])
    }
}

impl HealthTable {
    /// Buckets shared by the house-loan and fixed-deposit static paths.
    pub fn standard() -> Self {
        Self::new()
            .with_ranges(
                "CreditScore",
                &[
                    (750.0, INF, 100.0),
                    (700.0, 750.0, 75.0),
                    (650.0, 700.0, 50.0),
                    (NEG_INF, 650.0, 20.0),
                ],
            )
            .with_ranges(
                "Age",
                &[
                    (30.0, 55.0, 100.0),
                    (25.0, 30.0, 70.0),
                    (55.0, 65.0, 70.0),
                    (NEG_INF, 25.0, 30.0),
                    (65.0, INF, 30.0),
                ],
            )
            .with_ranges(
                "Tenure",
                &[
                    (7.0, INF, 100.0),
                    (4.0, 7.0, 75.0),
                    (1.0, 4.0, 40.0),
                    (NEG_INF, 1.0, 20.0),
                ],
            )
            .with_ranges(
                "Balance",
                &[
                    (100_000.0, INF, 100.0),
                    (50_000.0, 100_000.0, 80.0),
                    (10_000.0, 50_000.0, 60.0),
                    (NEG_INF, 10_000.0, 30.0),
                ],
            )
            .with_ranges(
                "NumOfProducts",
                &[
                    (4.0, 4.0, 100.0),
                    (3.0, 3.0, 90.0),
                    (2.0, 2.0, 75.0),
                    (1.0, 1.0, 50.0),
                ],
            )
            .with_categories("HasCrCard", &[("Yes", 80.0), ("No", 50.0)])
            .with_categories("IsActiveMember", &[("Yes", 100.0), ("No", 40.0)])
            .with_ranges(
                "EstimatedSalary",
                &[
                    (150_000.0, INF, 100.0),
                    (100_000.0, 150_000.0, 80.0),
                    (50_000.0, 100_000.0, 60.0),
                    (NEG_INF, 50_000.0, 30.0),
                ],
            )
            .with_categories(
                "LoanPurpose",
                &[
                    ("Home Purchase", 100.0),
                    ("Education Loan", 85.0),
                    ("Car Loan", 70.0),
                    ("Medical Loan", 50.0),
                    ("Personal Loan", 30.0),
                    ("Vacation/Leisure Loan", 10.0),
                ],
            )
            .with_categories(
                "HomeOwnershipStatus",
                &[("Own Home", 100.0), ("Mortgage", 80.0), ("Renting", 40.0)],
            )
            .with_categories(
                "MaritalStatus",
                &[
                    ("Married", 100.0),
                    ("Single", 70.0),
                    ("Divorced/Separated", 40.0),
                ],
            )
            .with_categories(
                "EducationLevel",
                &[
                    ("Doctorate/Master's", 100.0),
                    ("Bachelor's Degree", 80.0),
                    ("Diploma/High School", 50.0),
                    ("Below High School", 20.0),
                ],
            )
            .with_categories(
                "EmploymentStatus",
                &[
                    ("Full-Time Employed", 100.0),
                    ("Government Employee", 100.0),
                    ("Self-Employed", 70.0),
                    ("Part-Time/Freelance", 50.0),
                    ("Unemployed", 0.0),
                ],
            )
            .with_ranges(
                "DebtToIncomeRatio",
                &[(0.0, 20.0, 100.0), (20.0, 35.0, 62.0), (35.0, INF, 0.0)],
            )
            .with_ranges(
                "AnnualIncome",
                &[
                    (100_000.0, INF, 100.0),
                    (50_000.0, 100_000.0, 70.0),
                    (30_000.0, 50_000.0, 40.0),
                    (NEG_INF, 30_000.0, 0.0),
                ],
            )
            .with_ranges(
                "Experience",
                &[
                    (10.0, INF, 100.0),
                    (5.0, 10.0, 70.0),
                    (2.0, 5.0, 40.0),
                    (NEG_INF, 2.0, 0.0),
                ],
            )
            .with_ranges(
                "LoanAmount",
                &[(0.0, 0.3, 100.0), (0.3, 0.5, 60.0), (0.5, INF, 0.0)],
            )
            .with_ranges(
                "LoanDuration",
                &[(0.0, 36.0, 100.0), (36.0, 60.0, 70.0), (60.0, INF, 40.0)],
            )
            .with_ranges(
                "NumberOfDependents",
                &[(0.0, 2.0, 100.0), (2.0, 4.0, 70.0), (4.0, INF, 40.0)],
            )
            .with_ranges(
                "MonthlyDebtPayments",
                &[(0.0, 15.0, 100.0), (15.0, 30.0, 60.0), (30.0, INF, 20.0)],
            )
            .with_ranges(
                "CreditCardUtilizationRate",
                &[(0.0, 30.0, 100.0), (30.0, 50.0, 60.0), (50.0, INF, 0.0)],
            )
            .with_ranges(
                "NumberOfOpenCreditLines",
                &[
                    (3.0, 7.0, 100.0),
                    (1.0, 3.0, 70.0),
                    (7.0, 10.0, 70.0),
                    (NEG_INF, 1.0, 30.0),
                    (10.0, INF, 30.0),
                ],
            )
            .with_ranges(
                "NumberOfCreditInquiries",
                &[(0.0, 2.0, 100.0), (2.0, 4.0, 50.0), (4.0, INF, 0.0)],
            )
            .with_categories("BankruptcyHistory", &[("No", 100.0), ("Yes", 0.0)])
            .with_ranges(
                "PreviousLoanDefaults",
                &[(0.0, 1.0, 100.0), (1.0, 3.0, 50.0), (3.0, INF, 0.0)],
            )
            .with_categories(
                "PaymentHistory",
                &[("High", 100.0), ("Middle", 60.0), ("Low", 0.0)],
            )
            .with_ranges(
                "LengthOfCreditHistory",
                &[(10.0, INF, 100.0), (5.0, 10.0, 60.0), (NEG_INF, 5.0, 20.0)],
            )
            .with_ranges(
                "SavingsAccountBalance",
                &[
                    (10_000.0, INF, 100.0),
                    (2_000.0, 10_000.0, 60.0),
                    (NEG_INF, 2_000.0, 0.0),
                ],
            )
            .with_ranges(
                "CheckingAccountBalance",
                &[
                    (5_000.0, INF, 100.0),
                    (1_000.0, 5_000.0, 60.0),
                    (NEG_INF, 1_000.0, 0.0),
                ],
            )
            .with_ranges(
                "TotalAssets",
                &[
                    (100_000.0, INF, 100.0),
                    (30_000.0, 100_000.0, 60.0),
                    (NEG_INF, 30_000.0, 0.0),
                ],
            )
            .with_ranges(
                "TotalLiabilities",
                &[(0.0, 0.5, 100.0), (0.5, 0.8, 50.0), (0.8, INF, 0.0)],
            )
            .with_ranges(
                "MonthlyIncome",
                &[
                    (8_000.0, INF, 100.0),
                    (4_000.0, 8_000.0, 70.0),
                    (NEG_INF, 4_000.0, 30.0),
                ],
            )
            .with_ranges(
                "UtilityBillsPaymentHistory",
                &[(0.9, INF, 100.0), (0.7, 0.9, 70.0), (NEG_INF, 0.7, 30.0)],
            )
            .with_ranges(
                "JobTenure",
                &[(5.0, INF, 100.0), (2.0, 5.0, 70.0), (NEG_INF, 2.0, 30.0)],
            )
            .with_ranges(
                "NetWorth",
                &[
                    (100_000.0, INF, 100.0),
                    (30_000.0, 100_000.0, 60.0),
                    (NEG_INF, 30_000.0, 0.0),
                ],
            )
            .with_ranges(
                "TotalDebtToIncomeRatio",
                &[(0.0, 30.0, 100.0), (30.0, 50.0, 50.0), (50.0, INF, 0.0)],
            )
            .with_categories("Gender", &[("Male", 100.0), ("Female", 100.0)])
    }
}

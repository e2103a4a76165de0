//! 游戏化存储操作：XP 规则、XP 发放、原子币流水与经济配置

use super::{SeaOrmStorage, db_err, student_for_update};
use crate::entity::prelude::{AtomTransactions, EconomiaConfig, XpRules};
use crate::entity::{atom_transactions, economia_config, xp_awards, xp_rules};
use crate::errors::Result;
use crate::models::{
    PaginationInfo, Rejection,
    gamification::{
        entities::{AtomTransactionKind, EconomyConfig, XpRule},
        requests::{CreateXpRuleRequest, UpdateEconomyRequest, UpdateXpRuleRequest},
        responses::{
            AtomBalanceResponse, AtomTransactionListResponse, XpAwardOutcome, XpAwardResponse,
        },
    },
};
use crate::storage::GamificationStorage;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

/// 读取学校经济配置，缺失时使用默认值
pub(super) async fn load_economy<C: ConnectionTrait>(
    db: &C,
    school_id: i64,
) -> Result<EconomyConfig> {
    let found = EconomiaConfig::find()
        .filter(economia_config::Column::SchoolId.eq(school_id))
        .one(db)
        .await
        .map_err(db_err("查询经济配置失败"))?;

    Ok(match found {
        Some(model) => model.into_economy_config(),
        None => EconomyConfig {
            school_id,
            xp_per_atom: EconomyConfig::DEFAULT_XP_PER_ATOM,
            store_enabled: true,
            max_order_items: EconomyConfig::DEFAULT_MAX_ORDER_ITEMS,
            updated_at: chrono::Utc::now(),
        },
    })
}

#[async_trait::async_trait]
impl GamificationStorage for SeaOrmStorage {
    // ==================== XP 规则 ====================

    async fn create_xp_rule(&self, school_id: i64, req: CreateXpRuleRequest) -> Result<XpRule> {
        let now = chrono::Utc::now().timestamp();
        let model = xp_rules::ActiveModel {
            school_id: Set(school_id),
            name: Set(req.name),
            description: Set(req.description),
            xp_amount: Set(req.xp_amount),
            active: Set(req.active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err("创建 XP 规则失败"))?;

        Ok(model.into_xp_rule())
    }

    async fn get_xp_rule_by_id(&self, id: i64) -> Result<Option<XpRule>> {
        let result = XpRules::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询 XP 规则失败"))?;
        Ok(result.map(|m| m.into_xp_rule()))
    }

    async fn list_xp_rules(&self, school_id: Option<i64>) -> Result<Vec<XpRule>> {
        let mut select = XpRules::find();
        if let Some(school_id) = school_id {
            select = select.filter(xp_rules::Column::SchoolId.eq(school_id));
        }
        let rules = select
            .order_by_asc(xp_rules::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err("查询 XP 规则列表失败"))?;
        Ok(rules.into_iter().map(|m| m.into_xp_rule()).collect())
    }

    async fn update_xp_rule(
        &self,
        id: i64,
        update: UpdateXpRuleRequest,
    ) -> Result<Option<XpRule>> {
        let Some(existing) = XpRules::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询 XP 规则失败"))?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(xp_amount) = update.xp_amount {
            model.xp_amount = Set(xp_amount);
        }
        if let Some(active) = update.active {
            model.active = Set(active);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_err("更新 XP 规则失败"))?;
        Ok(Some(updated.into_xp_rule()))
    }

    async fn delete_xp_rule(&self, id: i64) -> Result<bool> {
        let result = XpRules::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除 XP 规则失败"))?;
        Ok(result.rows_affected > 0)
    }

    // ==================== XP 发放 ====================

    async fn award_xp(
        &self,
        rule_id: i64,
        student_ids: &[i64],
        awarded_by: i64,
        note: Option<String>,
    ) -> Result<std::result::Result<XpAwardResponse, Rejection>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let Some(rule) = XpRules::find_by_id(rule_id)
            .one(&txn)
            .await
            .map_err(db_err("查询 XP 规则失败"))?
        else {
            return Ok(Err(Rejection::XpRuleNotFound));
        };
        if !rule.active {
            return Ok(Err(Rejection::XpRuleInactive));
        }
        let economy = load_economy(&txn, rule.school_id).await?;

        let mut ids = student_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut results = Vec::with_capacity(ids.len());
        for student_id in ids {
            let Some(student) = student_for_update(student_id)
                .one(&txn)
                .await
                .map_err(db_err("查询学生失败"))?
            else {
                return Ok(Err(Rejection::StudentNotFound(student_id)));
            };
            if student.school_id != rule.school_id {
                return Ok(Err(Rejection::StudentOutsideSchool(student_id)));
            }

            let old_xp = student.xp;
            let new_xp = old_xp.saturating_add(rule.xp_amount);
            let credited = economy.atoms_for_gain(old_xp, new_xp);
            let new_atoms = student.atoms.saturating_add(credited);

            let mut model = student.into_active_model();
            model.xp = Set(new_xp);
            model.atoms = Set(new_atoms);
            model.updated_at = Set(now);
            model.update(&txn).await.map_err(db_err("更新学生 XP 失败"))?;

            let award = xp_awards::ActiveModel {
                school_id: Set(rule.school_id),
                student_id: Set(student_id),
                rule_id: Set(Some(rule.id)),
                awarded_by: Set(awarded_by),
                xp_amount: Set(rule.xp_amount),
                atoms_credited: Set(credited),
                note: Set(note.clone()),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(db_err("写入 XP 记录失败"))?;

            if credited > 0 {
                atom_transactions::ActiveModel {
                    school_id: Set(rule.school_id),
                    student_id: Set(student_id),
                    amount: Set(credited),
                    kind: Set(AtomTransactionKind::XpReward.to_string()),
                    reference_id: Set(Some(award.id)),
                    description: Set(Some(rule.name.clone())),
                    created_by: Set(Some(awarded_by)),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(db_err("写入原子币流水失败"))?;
            }

            results.push(XpAwardOutcome {
                student_id,
                xp: new_xp,
                atoms: new_atoms,
                atoms_credited: credited,
            });
        }

        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(Ok(XpAwardResponse {
            rule_id: rule.id,
            xp_amount: rule.xp_amount,
            results,
        }))
    }

    // ==================== 经济配置 ====================

    async fn get_economy_config(&self, school_id: i64) -> Result<EconomyConfig> {
        load_economy(&self.db, school_id).await
    }

    async fn update_economy_config(
        &self,
        school_id: i64,
        update: UpdateEconomyRequest,
    ) -> Result<EconomyConfig> {
        let now = chrono::Utc::now().timestamp();
        let existing = EconomiaConfig::find()
            .filter(economia_config::Column::SchoolId.eq(school_id))
            .one(&self.db)
            .await
            .map_err(db_err("查询经济配置失败"))?;

        let is_new = existing.is_none();
        let mut model = match existing {
            Some(model) => model.into_active_model(),
            None => economia_config::ActiveModel {
                school_id: Set(school_id),
                xp_per_atom: Set(EconomyConfig::DEFAULT_XP_PER_ATOM),
                store_enabled: Set(true),
                max_order_items: Set(EconomyConfig::DEFAULT_MAX_ORDER_ITEMS),
                ..Default::default()
            },
        };
        if let Some(xp_per_atom) = update.xp_per_atom {
            model.xp_per_atom = Set(xp_per_atom);
        }
        if let Some(store_enabled) = update.store_enabled {
            model.store_enabled = Set(store_enabled);
        }
        if let Some(max_order_items) = update.max_order_items {
            model.max_order_items = Set(max_order_items);
        }
        model.updated_at = Set(now);

        let saved = if is_new {
            model.insert(&self.db).await
        } else {
            model.update(&self.db).await
        }
        .map_err(db_err("保存经济配置失败"))?;
        Ok(saved.into_economy_config())
    }

    // ==================== 原子币 ====================

    async fn list_atom_transactions(
        &self,
        student_id: i64,
        page: u64,
        size: u64,
    ) -> Result<AtomTransactionListResponse> {
        let paginator = AtomTransactions::find()
            .filter(atom_transactions::Column::StudentId.eq(student_id))
            .order_by_desc(atom_transactions::Column::CreatedAt)
            .order_by_desc(atom_transactions::Column::Id)
            .paginate(&self.db, size);
        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(db_err("查询流水总数失败"))?;
        let items = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(db_err("查询流水列表失败"))?;

        Ok(AtomTransactionListResponse {
            items: items
                .into_iter()
                .map(|m| m.into_atom_transaction())
                .collect(),
            pagination: PaginationInfo::new(
                page,
                size,
                counts.number_of_items,
                counts.number_of_pages,
            ),
        })
    }

    async fn adjust_atoms(
        &self,
        student_id: i64,
        amount: i64,
        description: String,
        created_by: i64,
    ) -> Result<std::result::Result<AtomBalanceResponse, Rejection>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let Some(student) = student_for_update(student_id)
            .one(&txn)
            .await
            .map_err(db_err("查询学生失败"))?
        else {
            return Ok(Err(Rejection::StudentNotFound(student_id)));
        };

        let balance = student.atoms;
        let new_balance = balance.saturating_add(amount);
        if new_balance < 0 {
            return Ok(Err(Rejection::InsufficientAtoms {
                balance,
                required: amount.saturating_neg(),
            }));
        }
        let school_id = student.school_id;

        let mut model = student.into_active_model();
        model.atoms = Set(new_balance);
        model.updated_at = Set(now);
        model.update(&txn).await.map_err(db_err("更新原子币余额失败"))?;

        let transaction = atom_transactions::ActiveModel {
            school_id: Set(school_id),
            student_id: Set(student_id),
            amount: Set(amount),
            kind: Set(AtomTransactionKind::Adjustment.to_string()),
            reference_id: Set(None),
            description: Set(Some(description)),
            created_by: Set(Some(created_by)),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("写入原子币流水失败"))?;

        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(Ok(AtomBalanceResponse {
            student_id,
            atoms: new_balance,
            transaction: transaction.into_atom_transaction(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;
    use crate::storage::PeopleStorage;

    async fn rule(storage: &SeaOrmStorage, school_id: i64, xp: i64, active: bool) -> XpRule {
        storage
            .create_xp_rule(
                school_id,
                CreateXpRuleRequest {
                    school_id: None,
                    name: format!("Regra {xp}"),
                    description: None,
                    xp_amount: xp,
                    active,
                },
            )
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn test_award_credits_atoms_on_threshold() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola XP").await;
        let student = test_support::student(&storage, school.id, "X-1").await;
        let rule = rule(&storage, school.id, 7, true).await;

        // xp_per_atom = 10：0 -> 7 不产生原子币，7 -> 14 产生 1 个
        let first = storage
            .award_xp(rule.id, &[student.id], 1, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.results[0].xp, 7);
        assert_eq!(first.results[0].atoms_credited, 0);

        let second = storage
            .award_xp(rule.id, &[student.id], 1, Some("participação".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.results[0].xp, 14);
        assert_eq!(second.results[0].atoms_credited, 1);

        let student = storage.get_student_by_id(student.id).await.unwrap().unwrap();
        assert_eq!(student.xp, 14);
        assert_eq!(student.atoms, 1);

        let history = storage
            .list_atom_transactions(student.id, 1, 10)
            .await
            .unwrap();
        assert_eq!(history.pagination.total, 1);
        assert_eq!(history.items[0].kind, AtomTransactionKind::XpReward);
        assert_eq!(history.items[0].amount, 1);
    }

    #[actix_web::test]
    async fn test_award_rejects_inactive_rule_and_foreign_student() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola A").await;
        let other = test_support::school(&storage, "Escola B").await;
        let ours = test_support::student(&storage, school.id, "A-1").await;
        let theirs = test_support::student(&storage, other.id, "B-1").await;

        let inactive = rule(&storage, school.id, 5, false).await;
        assert_eq!(
            storage
                .award_xp(inactive.id, &[ours.id], 1, None)
                .await
                .unwrap()
                .unwrap_err(),
            Rejection::XpRuleInactive
        );

        // 一名学生不属于该校时整体回滚
        let active = rule(&storage, school.id, 50, true).await;
        assert_eq!(
            storage
                .award_xp(active.id, &[ours.id, theirs.id], 1, None)
                .await
                .unwrap()
                .unwrap_err(),
            Rejection::StudentOutsideSchool(theirs.id)
        );
        let ours = storage.get_student_by_id(ours.id).await.unwrap().unwrap();
        assert_eq!(ours.xp, 0);
        assert_eq!(ours.atoms, 0);

        assert_eq!(
            storage.award_xp(9999, &[ours.id], 1, None).await.unwrap().unwrap_err(),
            Rejection::XpRuleNotFound
        );
    }

    #[actix_web::test]
    async fn test_adjust_atoms_never_negative() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Ajuste").await;
        let student = test_support::student(&storage, school.id, "J-1").await;

        let credited = storage
            .adjust_atoms(student.id, 20, "bônus".to_string(), 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credited.atoms, 20);
        assert_eq!(credited.transaction.kind, AtomTransactionKind::Adjustment);

        let rejected = storage
            .adjust_atoms(student.id, -25, "multa".to_string(), 1)
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(
            rejected,
            Rejection::InsufficientAtoms {
                balance: 20,
                required: 25
            }
        );

        let debited = storage
            .adjust_atoms(student.id, -20, "troca".to_string(), 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(debited.atoms, 0);
    }

    #[actix_web::test]
    async fn test_update_economy_config() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Economia").await;

        let updated = storage
            .update_economy_config(
                school.id,
                UpdateEconomyRequest {
                    school_id: None,
                    xp_per_atom: Some(25),
                    store_enabled: Some(false),
                    max_order_items: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.xp_per_atom, 25);
        assert!(!updated.store_enabled);
        assert_eq!(updated.max_order_items, EconomyConfig::DEFAULT_MAX_ORDER_ITEMS);

        let reloaded = storage.get_economy_config(school.id).await.unwrap();
        assert_eq!(reloaded.xp_per_atom, 25);
    }
}
